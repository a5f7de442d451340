use std::sync::Arc;

use alloy::providers::ProviderBuilder;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use seiscout_api::api::{self, AppState};
use seiscout_api::config::Config;
use seiscout_api::source::rpc::RpcEventSource;
use seiscout_api::synth::SyntheticSource;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("SeiScout API starting");

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!(
        chain = %config.chain.name,
        chain_id = config.chain.chain_id,
        "Configuration loaded from {}",
        config_path
    );

    // Construct the chain event source once and inject it into the API state
    let provider = ProviderBuilder::new().connect_http(
        config
            .chain
            .rpc_http
            .parse()
            .map_err(|e| eyre::eyre!("Invalid RPC URL: {}", e))?,
    );
    let source = RpcEventSource::new(provider, &config.chain);
    let synth = SyntheticSource::new(config.synth.seed);

    let host = config.api.host.clone();
    let port = config.api.port;
    let state = AppState {
        source: Arc::new(source),
        synth,
        config,
    };

    // Create shutdown signal
    let shutdown = CancellationToken::new();

    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = api::serve(state, &host, port, shutdown).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    tracing::info!("API server started. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping API server...");
    shutdown.cancel();

    let _ = server.await;

    tracing::info!("SeiScout API stopped gracefully");
    Ok(())
}
