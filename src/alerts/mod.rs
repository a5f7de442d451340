pub mod rules;
pub mod types;
pub mod verification;

use chrono::{DateTime, Utc};

use crate::config::AlertRulesConfig;
use crate::source::TransferEvent;

use self::types::Alert;

/// Run every configured rule over a freshly fetched window of transfers.
///
/// `detected_at` is when the fetch began and `delivered_at` when the batch
/// finished processing; both stamps land on every alert so the
/// detection-to-delivery latency is measured, not simulated.
pub fn detect_alerts(
    events: &[TransferEvent],
    config: &AlertRulesConfig,
    decimals: u8,
    symbol: &str,
    window_blocks: u64,
    detected_at: DateTime<Utc>,
    delivered_at: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for event in events {
        if let Some(alert) = rules::check_whale_movement(
            event,
            config.whale_threshold,
            decimals,
            symbol,
            detected_at,
            delivered_at,
        ) {
            alerts.push(alert);
        }
    }

    if let Some(alert) = rules::check_volume_spike(
        events,
        config.volume_spike_per_block,
        window_blocks,
        detected_at,
        delivered_at,
    ) {
        alerts.push(alert);
    }

    if !alerts.is_empty() {
        tracing::info!(
            count = alerts.len(),
            events = events.len(),
            "Alerts detected in window"
        );
    }

    alerts
}
