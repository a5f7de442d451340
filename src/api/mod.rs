pub mod handlers;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::source::EventSource;
use crate::synth::SyntheticSource;

pub struct AppState {
    pub source: Arc<dyn EventSource>,
    pub synth: SyntheticSource,
    pub config: Config,
}

pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/wallets/top", get(handlers::top_wallets))
        .route("/api/v1/wallet/{address}", get(handlers::wallet_summary))
        .route("/api/v1/alerts/recent", get(handlers::recent_alerts))
        .route(
            "/api/v1/alerts/verification",
            get(handlers::verification_report),
        )
        .route("/api/v1/alerts/export", get(handlers::export_alerts))
        .route("/api/v1/network/status", get(handlers::network_status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    shutdown: CancellationToken,
) -> eyre::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
