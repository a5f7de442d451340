use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of alerts the rules engine and the fallback generator emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    WhaleMovement,
    VolumeSpike,
    PriceChange,
    Arbitrage,
    NetworkLatency,
    NetworkError,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhaleMovement => "whale_movement",
            Self::VolumeSpike => "volume_spike",
            Self::PriceChange => "price_change",
            Self::Arbitrage => "arbitrage",
            Self::NetworkLatency => "network_latency",
            Self::NetworkError => "network_error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// On-chain evidence attached to alerts raised from real log matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvidence {
    pub contract: String,
    pub topics: Vec<String>,
    pub block_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub address: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub detected_at: DateTime<Utc>,
    pub delivered_at: DateTime<Utc>,
    pub latency_ms: u64,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<AlertEvidence>,
}

impl Alert {
    /// Derive `latency_ms` from the two timestamps so
    /// `delivered_at - detected_at == latency_ms` holds at every
    /// construction site.
    pub fn latency_between(detected_at: DateTime<Utc>, delivered_at: DateTime<Utc>) -> u64 {
        (delivered_at - detected_at).num_milliseconds().max(0) as u64
    }

    pub fn is_sub_second(&self) -> bool {
        self.latency_ms < 1000
    }
}
