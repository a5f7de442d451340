use alloy::primitives::{Address, U256};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use crate::activity::rank::{blocks_ago_label, category, risk_score, top_n, RankedWallet};
use crate::activity::stats::{format_volume, AggregateStats};
use crate::activity::{raw_to_human, ActivityBook, WalletMetrics};
use crate::alerts::detect_alerts;
use crate::alerts::types::Alert;
use crate::alerts::verification::{hourly_counts, VerificationStats};
use crate::explorer;
use crate::export;
use crate::source::{LogSide, NetworkProbe, SourceError, TransferEvent};

use super::types::*;
use super::AppState;

/// Hard cap on the fetch window; larger requests are clamped, not rejected.
const MAX_WINDOW_BLOCKS: u64 = 5000;
const DEFAULT_TOP_N: usize = 10;
const MAX_TOP_N: usize = 100;
const DEFAULT_ALERT_LIMIT: usize = 20;
const MAX_ALERT_LIMIT: usize = 200;
/// How many alerts back the verification report looks.
const VERIFICATION_ALERT_COUNT: usize = 50;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

fn bounded_window(
    requested: Option<u64>,
    default: u64,
) -> Result<u64, (StatusCode, Json<ErrorResponse>)> {
    let window = requested.unwrap_or(default);
    if window == 0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "window must be at least 1 block",
        ));
    }
    Ok(window.min(MAX_WINDOW_BLOCKS))
}

fn meta(
    state: &AppState,
    source: DataOrigin,
    latest_block: u64,
    blocks_analyzed: u64,
    skipped_logs: usize,
) -> Meta {
    Meta {
        last_updated: Utc::now(),
        data_source: state.config.chain.name.clone(),
        blocks_analyzed,
        latest_block,
        skipped_logs,
        source,
    }
}

// ============================================================
// Live fetch plumbing
// ============================================================

struct LiveWindow {
    events: Vec<TransferEvent>,
    latest_block: u64,
    skipped_logs: usize,
}

async fn fetch_window(
    state: &AppState,
    window: u64,
    side: LogSide,
) -> Result<LiveWindow, SourceError> {
    let latest_block = state.source.latest_block_number().await?;
    let from_block = latest_block.saturating_sub(window - 1);
    let report = state
        .source
        .fetch_transfer_logs(from_block, latest_block, side)
        .await?;
    Ok(LiveWindow {
        events: report.events,
        latest_block,
        skipped_logs: report.skipped_logs,
    })
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (rpc_reachable, latest_block) = match state.source.latest_block_number().await {
        Ok(block) => (true, Some(block)),
        Err(e) => {
            tracing::warn!(error = %e, "Health probe failed to reach RPC");
            (false, None)
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        chain: state.config.chain.name.clone(),
        chain_id: state.config.chain.chain_id,
        rpc_reachable,
        latest_block,
    })
}

// ============================================================
// Wallet leaderboard
// ============================================================

pub async fn top_wallets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopWalletsParams>,
) -> ApiResult<TopWalletsResponse> {
    let n = params.n.unwrap_or(DEFAULT_TOP_N).min(MAX_TOP_N);
    let window = bounded_window(params.window, state.config.chain.default_window_blocks)?;

    match fetch_window(&state, window, LogSide::Any).await {
        Ok(live) if !live.events.is_empty() => {
            let chain = &state.config.chain;
            let book = ActivityBook::from_events(&live.events);
            let stats = AggregateStats::compute(
                &book,
                &live.events,
                live.latest_block,
                chain.activity_window_blocks,
                chain.native_decimals,
                &chain.native_symbol,
            );
            let wallets = top_n(&book, n)
                .into_iter()
                .map(|w| ranked_entry(&state, w, live.latest_block))
                .collect();

            Ok(Json(TopWalletsResponse {
                wallets,
                stats,
                metadata: meta(
                    &state,
                    DataOrigin::Live,
                    live.latest_block,
                    window,
                    live.skipped_logs,
                ),
            }))
        }
        Ok(_) => {
            tracing::debug!(window, "No transfers in window, serving synthetic leaderboard");
            Ok(Json(synthetic_top_wallets(&state, n, window)))
        }
        Err(e) if e.is_recoverable() => {
            tracing::warn!(error = %e, "Event source unavailable, serving synthetic leaderboard");
            Ok(Json(synthetic_top_wallets(&state, n, window)))
        }
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e.to_string())),
    }
}

fn ranked_entry(state: &AppState, wallet: RankedWallet, latest_block: u64) -> RankedWalletEntry {
    let address = format!("{:#x}", wallet.address);
    RankedWalletEntry {
        tx_count: wallet.tx_count,
        counterparties: wallet.counterparties,
        last_activity: blocks_ago_label(
            latest_block,
            wallet.last_seen_block,
            state.config.chain.block_time_ms,
        ),
        category: wallet.category.to_string(),
        risk_score: wallet.risk_score,
        seitrace_url: explorer::seitrace_address(&address),
        address,
    }
}

fn synthetic_top_wallets(state: &AppState, n: usize, window: u64) -> TopWalletsResponse {
    let latest_block = state.synth.latest_block();
    let (wallets, stats) =
        state
            .synth
            .ranked_wallets(n, latest_block, &state.config.chain.native_symbol);
    let wallets = wallets
        .into_iter()
        .map(|w| ranked_entry(state, w, latest_block))
        .collect();

    TopWalletsResponse {
        wallets,
        stats,
        metadata: meta(state, DataOrigin::Synthetic, latest_block, window, 0),
    }
}

// ============================================================
// Single-wallet summary
// ============================================================

pub async fn wallet_summary(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(params): Query<WalletParams>,
) -> ApiResult<WalletSummaryResponse> {
    let addr = parse_address(&address).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let window = bounded_window(params.window, state.config.chain.default_window_blocks)?;

    match fetch_wallet(&state, addr, window).await {
        Ok((metrics, balance, latest_block, skipped)) if metrics.tx_count > 0 => {
            let chain = &state.config.chain;
            let address_hex = format!("{:#x}", addr);
            let balance_human = raw_to_human(&balance.to_string(), chain.native_decimals);

            Ok(Json(WalletSummaryResponse {
                balance: balance_human.to_string(),
                balance_formatted: format_volume(&balance_human, &chain.native_symbol),
                tx_count: metrics.tx_count,
                sent_count: metrics.sent_count,
                received_count: metrics.received_count,
                counterparties: metrics.counterparties.len() as u64,
                volume: format_volume(&metrics.volume, &chain.native_symbol),
                category: category(metrics.tx_count).to_string(),
                risk_score: risk_score(metrics.tx_count),
                last_activity: blocks_ago_label(
                    latest_block,
                    metrics.last_seen_block,
                    chain.block_time_ms,
                ),
                seitrace_url: explorer::seitrace_address(&address_hex),
                address: address_hex,
                metadata: meta(&state, DataOrigin::Live, latest_block, window, skipped),
            }))
        }
        Ok(_) => {
            tracing::debug!(address = %addr, "No transfers for wallet in window, serving synthetic summary");
            Ok(Json(synthetic_wallet_summary(&state, addr, window)))
        }
        Err(e) if e.is_recoverable() => {
            tracing::warn!(error = %e, "Event source unavailable, serving synthetic wallet summary");
            Ok(Json(synthetic_wallet_summary(&state, addr, window)))
        }
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e.to_string())),
    }
}

/// Outgoing and incoming logs plus the native balance, joined concurrently.
async fn fetch_wallet(
    state: &AppState,
    addr: Address,
    window: u64,
) -> Result<(WalletMetrics, U256, u64, usize), SourceError> {
    let latest_block = state.source.latest_block_number().await?;
    let from_block = latest_block.saturating_sub(window - 1);

    let (outgoing, incoming, balance) = tokio::try_join!(
        state
            .source
            .fetch_transfer_logs(from_block, latest_block, LogSide::Sender(addr)),
        state
            .source
            .fetch_transfer_logs(from_block, latest_block, LogSide::Recipient(addr)),
        state.source.native_balance(addr),
    )?;

    let skipped = outgoing.skipped_logs + incoming.skipped_logs;
    let mut events = outgoing.events;
    events.extend(incoming.events);

    let metrics = WalletMetrics::from_events(&events, addr, state.config.chain.native_decimals);
    Ok((metrics, balance, latest_block, skipped))
}

fn synthetic_wallet_summary(
    state: &AppState,
    addr: Address,
    window: u64,
) -> WalletSummaryResponse {
    let chain = &state.config.chain;
    let latest_block = state.synth.latest_block();
    let wallet = state.synth.wallet(addr, latest_block);
    let address = format!("{:#x}", wallet.address);

    WalletSummaryResponse {
        balance: wallet.balance.to_string(),
        balance_formatted: format_volume(&wallet.balance, &chain.native_symbol),
        tx_count: wallet.tx_count,
        sent_count: wallet.sent_count,
        received_count: wallet.received_count,
        counterparties: wallet.counterparties,
        volume: format_volume(&wallet.volume, &chain.native_symbol),
        category: category(wallet.tx_count).to_string(),
        risk_score: risk_score(wallet.tx_count),
        last_activity: blocks_ago_label(
            latest_block,
            latest_block.saturating_sub(wallet.last_seen_offset),
            chain.block_time_ms,
        ),
        seitrace_url: explorer::seitrace_address(&address),
        address,
        metadata: meta(state, DataOrigin::Synthetic, latest_block, window, 0),
    }
}

// ============================================================
// Alerts
// ============================================================

struct AlertBatch {
    alerts: Vec<Alert>,
    metadata: Meta,
}

/// Run the rules over a live window; serve the seeded generator when the
/// source is down or no rule fired.
async fn collect_alerts(state: &AppState, limit: usize, window: u64) -> AlertBatch {
    let chain = &state.config.chain;
    let detected_at = Utc::now();

    match fetch_window(state, window, LogSide::Any).await {
        Ok(live) => {
            let delivered_at = Utc::now();
            let mut alerts = detect_alerts(
                &live.events,
                &state.config.rules,
                chain.native_decimals,
                &chain.native_symbol,
                window,
                detected_at,
                delivered_at,
            );
            if !alerts.is_empty() {
                alerts.truncate(limit);
                return AlertBatch {
                    alerts,
                    metadata: meta(
                        state,
                        DataOrigin::Live,
                        live.latest_block,
                        window,
                        live.skipped_logs,
                    ),
                };
            }
            tracing::debug!(window, "No rule fired on live window, serving synthetic alerts");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Event source unavailable, serving synthetic alerts");
        }
    }

    let latest_block = state.synth.latest_block();
    let alerts = state
        .synth
        .alerts(limit, Utc::now(), &chain.native_symbol);
    AlertBatch {
        alerts,
        metadata: meta(state, DataOrigin::Synthetic, latest_block, window, 0),
    }
}

pub async fn recent_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsParams>,
) -> ApiResult<AlertsResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_ALERT_LIMIT).min(MAX_ALERT_LIMIT);
    let window = bounded_window(params.window, state.config.chain.default_window_blocks)?;

    let batch = collect_alerts(&state, limit, window).await;
    Ok(Json(AlertsResponse {
        alerts: batch.alerts,
        metadata: batch.metadata,
    }))
}

pub async fn verification_report(
    State(state): State<Arc<AppState>>,
) -> ApiResult<VerificationResponse> {
    let window = state.config.chain.default_window_blocks;
    let batch = collect_alerts(&state, VERIFICATION_ALERT_COUNT, window).await;

    let stats = VerificationStats::from_alerts(&batch.alerts, state.config.rules.uptime_pct);
    let metrics = VerificationMetrics {
        latency_distribution: stats.latency_distribution.clone(),
        severity_breakdown: stats.severity_breakdown.clone(),
        hourly_stats: hourly_counts(&batch.alerts, Utc::now(), 24),
    };

    Ok(Json(VerificationResponse {
        stats,
        metrics,
        alerts: batch.alerts,
        metadata: batch.metadata,
    }))
}

pub async fn export_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let format = params.format.as_deref().unwrap_or("json");
    if format != "csv" && format != "json" {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Unsupported export format '{}', expected csv or json", format),
        ));
    }

    let limit = params.limit.unwrap_or(VERIFICATION_ALERT_COUNT).min(MAX_ALERT_LIMIT);
    let batch = collect_alerts(&state, limit, state.config.chain.default_window_blocks).await;
    let stats = VerificationStats::from_alerts(&batch.alerts, state.config.rules.uptime_pct);

    if format == "csv" {
        let body = export::alerts_to_csv(&batch.alerts)
            .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"alerts.csv\"",
                ),
            ],
            body,
        )
            .into_response());
    }

    Ok(Json(export::alerts_to_json(&batch.alerts, &stats, Utc::now())).into_response())
}

// ============================================================
// Network status
// ============================================================

pub async fn network_status(State(state): State<Arc<AppState>>) -> Json<NetworkStatusResponse> {
    match state.source.probe().await {
        Ok(probe) => Json(status_response(&state, probe, DataOrigin::Live, "healthy")),
        Err(e) => {
            tracing::warn!(error = %e, "Network probe failed, serving synthetic status");
            Json(status_response(
                &state,
                state.synth.probe(),
                DataOrigin::Synthetic,
                "degraded",
            ))
        }
    }
}

fn status_response(
    state: &AppState,
    probe: NetworkProbe,
    source: DataOrigin,
    rpc_status: &str,
) -> NetworkStatusResponse {
    NetworkStatusResponse {
        chain_id: state.config.chain.chain_id,
        block_height: probe.block_height,
        gas_price_wei: probe.gas_price.to_string(),
        network_latency_ms: probe.latency_ms,
        rpc_status: rpc_status.to_string(),
        last_checked: Utc::now(),
        source,
    }
}
