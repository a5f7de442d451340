use bigdecimal::ToPrimitive;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::activity::{raw_to_human, ZERO_ADDRESS};
use crate::source::TransferEvent;

use super::types::{Alert, AlertEvidence, AlertKind, Severity};

/// Check if a single transfer moves more than the whale threshold.
pub fn check_whale_movement(
    event: &TransferEvent,
    threshold: f64,
    decimals: u8,
    symbol: &str,
    detected_at: DateTime<Utc>,
    delivered_at: DateTime<Utc>,
) -> Option<Alert> {
    let human_amount = raw_to_human(&event.value.to_string(), decimals)
        .to_f64()
        .unwrap_or(0.0);

    if human_amount < threshold {
        return None;
    }

    let severity = if human_amount >= threshold * 10.0 {
        Severity::Critical
    } else if human_amount >= threshold * 5.0 {
        Severity::High
    } else {
        Severity::Medium
    };

    Some(Alert {
        id: format!("whale-{}-{:x}", event.block_number, &event.tx_hash),
        kind: AlertKind::WhaleMovement,
        severity,
        title: format!("Large transfer detected: {:.1} {}", human_amount, symbol),
        address: format!("{:#x}", event.from),
        tx_hash: format!("{:#x}", event.tx_hash),
        block_number: event.block_number,
        detected_at,
        delivered_at,
        latency_ms: Alert::latency_between(detected_at, delivered_at),
        verified: true,
        evidence: Some(evidence_for(event)),
    })
}

/// Check if the window's event rate crosses the spike threshold.
/// Raises at most one alert per window, anchored at the busiest address.
pub fn check_volume_spike(
    events: &[TransferEvent],
    per_block_threshold: f64,
    window_blocks: u64,
    detected_at: DateTime<Utc>,
    delivered_at: DateTime<Utc>,
) -> Option<Alert> {
    if events.is_empty() || window_blocks == 0 {
        return None;
    }

    let rate = events.len() as f64 / window_blocks as f64;
    if rate < per_block_threshold {
        return None;
    }

    let severity = if rate >= per_block_threshold * 5.0 {
        Severity::High
    } else {
        Severity::Medium
    };

    let anchor = busiest_address(events);
    let last = &events[events.len() - 1];

    Some(Alert {
        id: format!(
            "spike-{}-{}",
            events[0].block_number, last.block_number
        ),
        kind: AlertKind::VolumeSpike,
        severity,
        title: format!(
            "Volume spike: {} transfers over {} blocks",
            events.len(),
            window_blocks
        ),
        address: anchor.map(|a| format!("{:#x}", a)).unwrap_or_default(),
        tx_hash: format!("{:#x}", last.tx_hash),
        block_number: last.block_number,
        detected_at,
        delivered_at,
        latency_ms: Alert::latency_between(detected_at, delivered_at),
        verified: true,
        evidence: Some(evidence_for(last)),
    })
}

fn evidence_for(event: &TransferEvent) -> AlertEvidence {
    AlertEvidence {
        contract: format!("{:#x}", event.contract),
        topics: vec![
            format!("{:#x}", event.from.into_word()),
            format!("{:#x}", event.to.into_word()),
        ],
        block_hash: format!("{:#x}", event.block_hash),
    }
}

/// The non-zero address appearing most often in the window, on either side.
fn busiest_address(events: &[TransferEvent]) -> Option<alloy::primitives::Address> {
    let mut counts: HashMap<alloy::primitives::Address, u64> = HashMap::new();
    for event in events {
        if event.from != ZERO_ADDRESS {
            *counts.entry(event.from).or_default() += 1;
        }
        if event.to != ZERO_ADDRESS {
            *counts.entry(event.to).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(addr, _)| addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};
    use chrono::TimeZone;

    fn event(from_byte: u8, to_byte: u8, value: u128, block: u64) -> TransferEvent {
        TransferEvent {
            contract: Address::repeat_byte(0xee),
            from: Address::repeat_byte(from_byte),
            to: Address::repeat_byte(to_byte),
            value: U256::from(value),
            block_number: block,
            tx_hash: B256::repeat_byte(0xcc),
            block_hash: B256::repeat_byte(0xbb),
        }
    }

    fn stamps() -> (DateTime<Utc>, DateTime<Utc>) {
        let detected = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        (detected, detected + chrono::Duration::milliseconds(120))
    }

    #[test]
    fn test_whale_movement_threshold() {
        let (detected, delivered) = stamps();
        let below = event(1, 2, 999, 10);
        assert!(check_whale_movement(&below, 1000.0, 0, "SEI", detected, delivered).is_none());

        let above = event(1, 2, 1_500, 10);
        let alert =
            check_whale_movement(&above, 1000.0, 0, "SEI", detected, delivered).unwrap();
        assert_eq!(alert.kind, AlertKind::WhaleMovement);
        assert_eq!(alert.severity, Severity::Medium);
        assert_eq!(alert.latency_ms, 120);
        assert!(alert.evidence.is_some());
    }

    #[test]
    fn test_whale_severity_steps() {
        let (detected, delivered) = stamps();
        let high = check_whale_movement(&event(1, 2, 5_000, 10), 1000.0, 0, "SEI", detected, delivered)
            .unwrap();
        assert_eq!(high.severity, Severity::High);

        let critical =
            check_whale_movement(&event(1, 2, 10_000, 10), 1000.0, 0, "SEI", detected, delivered)
                .unwrap();
        assert_eq!(critical.severity, Severity::Critical);
    }

    #[test]
    fn test_whale_respects_decimals() {
        let (detected, delivered) = stamps();
        // 1.5e18 raw at 18 decimals is only 1.5 human units.
        let ev = event(1, 2, 1_500_000_000_000_000_000, 10);
        assert!(check_whale_movement(&ev, 1000.0, 18, "SEI", detected, delivered).is_none());
    }

    #[test]
    fn test_volume_spike_rate() {
        let (detected, delivered) = stamps();
        let events: Vec<TransferEvent> = (0..30).map(|i| event(1, 2, 10, 100 + i)).collect();

        // 30 events over 100 blocks is below a 1-per-block threshold.
        assert!(check_volume_spike(&events, 1.0, 100, detected, delivered).is_none());

        // Over 10 blocks the same batch is a 3-per-block spike.
        let alert = check_volume_spike(&events, 1.0, 10, detected, delivered).unwrap();
        assert_eq!(alert.kind, AlertKind::VolumeSpike);
        assert_eq!(alert.latency_ms, 120);
    }

    #[test]
    fn test_volume_spike_empty_window() {
        let (detected, delivered) = stamps();
        assert!(check_volume_spike(&[], 1.0, 10, detected, delivered).is_none());
    }

    #[test]
    fn test_busiest_address_ignores_zero() {
        // repeat_byte(0) is the zero address: the mint side must not count.
        let events = vec![event(1, 2, 10, 1), event(0, 2, 10, 2)];
        // Address 2 appears in both events, address 1 once.
        assert_eq!(busiest_address(&events), Some(Address::repeat_byte(2)));
    }
}
