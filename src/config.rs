use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rules: AlertRulesConfig,
    #[serde(default)]
    pub synth: SynthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    #[serde(default = "default_chain_name")]
    pub name: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_rpc_http")]
    pub rpc_http: String,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,
    /// Nominal block time, used only to turn block deltas into time-ago labels.
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    /// How far back a fetch window reaches when the caller doesn't say.
    #[serde(default = "default_window_blocks")]
    pub default_window_blocks: u64,
    /// Block-count proxy for "active in the last 24h".
    #[serde(default = "default_activity_window_blocks")]
    pub activity_window_blocks: u64,
}

fn default_chain_name() -> String {
    "sei".to_string()
}

fn default_chain_id() -> u64 {
    1329
}

fn default_rpc_http() -> String {
    "https://evm-rpc.sei-apis.com".to_string()
}

fn default_native_symbol() -> String {
    "SEI".to_string()
}

fn default_native_decimals() -> u8 {
    18
}

fn default_block_time_ms() -> u64 {
    400
}

fn default_rpc_timeout_secs() -> u64 {
    8
}

fn default_window_blocks() -> u64 {
    5000
}

fn default_activity_window_blocks() -> u64 {
    3600
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: default_chain_name(),
            chain_id: default_chain_id(),
            rpc_http: default_rpc_http(),
            native_symbol: default_native_symbol(),
            native_decimals: default_native_decimals(),
            block_time_ms: default_block_time_ms(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            default_window_blocks: default_window_blocks(),
            activity_window_blocks: default_activity_window_blocks(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    3000
}

// ============================================================
// Alert Rules Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct AlertRulesConfig {
    /// Whale threshold in human token units.
    #[serde(default = "default_whale_threshold")]
    pub whale_threshold: f64,
    /// Transfer events per block above which the window counts as a spike.
    #[serde(default = "default_volume_spike_per_block")]
    pub volume_spike_per_block: f64,
    /// Reported uptime claim. Not measured, surfaced as-is in verification stats.
    #[serde(default = "default_uptime_pct")]
    pub uptime_pct: f64,
}

impl Default for AlertRulesConfig {
    fn default() -> Self {
        Self {
            whale_threshold: default_whale_threshold(),
            volume_spike_per_block: default_volume_spike_per_block(),
            uptime_pct: default_uptime_pct(),
        }
    }
}

fn default_whale_threshold() -> f64 {
    1_000_000.0
}

fn default_volume_spike_per_block() -> f64 {
    2.0
}

fn default_uptime_pct() -> f64 {
    99.8
}

// ============================================================
// Synthetic Data Config
// ============================================================

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SynthConfig {
    /// Fixed RNG seed for the fallback generator. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if !self.chain.rpc_http.starts_with("http") {
            return Err(eyre::eyre!(
                "Invalid RPC URL '{}' for chain '{}'",
                self.chain.rpc_http,
                self.chain.name
            ));
        }
        if self.chain.default_window_blocks == 0 {
            return Err(eyre::eyre!("default_window_blocks must be at least 1"));
        }
        if self.chain.activity_window_blocks == 0 {
            return Err(eyre::eyre!("activity_window_blocks must be at least 1"));
        }
        if self.chain.rpc_timeout_secs == 0 {
            return Err(eyre::eyre!("rpc_timeout_secs must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.rules.uptime_pct) {
            return Err(eyre::eyre!(
                "uptime_pct must be within 0..=100, got {}",
                self.rules.uptime_pct
            ));
        }
        Ok(())
    }
}
