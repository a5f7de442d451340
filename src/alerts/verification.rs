use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Alert, Severity};

/// Cumulative latency buckets: `under_500` includes everything `under_100`
/// counted, and so on. The non-overlapping slices plus `over_1000` always
/// sum back to the alert total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    pub under_100: u64,
    pub under_500: u64,
    pub under_1000: u64,
    pub over_1000: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// One hour of alert history for the verification page chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub hour: String,
    pub alerts: u64,
    pub avg_latency_ms: u64,
}

/// Pure aggregate view over a collection of alerts. Recomputed on each
/// request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationStats {
    pub total_alerts: u64,
    pub avg_latency_ms: u64,
    pub sub_second_alerts: u64,
    pub uptime_pct: f64,
    pub latency_distribution: LatencyDistribution,
    pub severity_breakdown: SeverityBreakdown,
}

impl VerificationStats {
    pub fn from_alerts(alerts: &[Alert], uptime_pct: f64) -> Self {
        let total_alerts = alerts.len() as u64;

        let latency_sum: u64 = alerts.iter().map(|a| a.latency_ms).sum();
        let avg_latency_ms = if total_alerts > 0 {
            latency_sum / total_alerts
        } else {
            0
        };

        let mut dist = LatencyDistribution::default();
        let mut severity = SeverityBreakdown::default();
        for alert in alerts {
            if alert.latency_ms < 100 {
                dist.under_100 += 1;
            }
            if alert.latency_ms < 500 {
                dist.under_500 += 1;
            }
            if alert.latency_ms < 1000 {
                dist.under_1000 += 1;
            } else {
                dist.over_1000 += 1;
            }

            match alert.severity {
                Severity::Critical => severity.critical += 1,
                Severity::High => severity.high += 1,
                Severity::Medium => severity.medium += 1,
                Severity::Low => severity.low += 1,
            }
        }

        Self {
            total_alerts,
            avg_latency_ms,
            sub_second_alerts: dist.under_1000,
            uptime_pct,
            latency_distribution: dist,
            severity_breakdown: severity,
        }
    }
}

/// Bucket alerts by delivery hour over the trailing `hours` hours,
/// oldest bucket first.
pub fn hourly_counts(alerts: &[Alert], now: DateTime<Utc>, hours: u32) -> Vec<HourlyBucket> {
    let mut buckets = Vec::with_capacity(hours as usize);

    for offset in (0..hours as i64).rev() {
        let end = now - Duration::hours(offset);
        let start = end - Duration::hours(1);

        let in_bucket: Vec<&Alert> = alerts
            .iter()
            .filter(|a| a.delivered_at > start && a.delivered_at <= end)
            .collect();

        let count = in_bucket.len() as u64;
        let avg_latency_ms = if count > 0 {
            in_bucket.iter().map(|a| a.latency_ms).sum::<u64>() / count
        } else {
            0
        };

        buckets.push(HourlyBucket {
            hour: format!("{:02}:00", end.hour()),
            alerts: count,
            avg_latency_ms,
        });
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::AlertKind;
    use chrono::TimeZone;

    fn alert(latency_ms: u64, severity: Severity, delivered_at: DateTime<Utc>) -> Alert {
        Alert {
            id: format!("test-{}", latency_ms),
            kind: AlertKind::WhaleMovement,
            severity,
            title: "test".to_string(),
            address: String::new(),
            tx_hash: String::new(),
            block_number: 1,
            detected_at: delivered_at - Duration::milliseconds(latency_ms as i64),
            delivered_at,
            latency_ms,
            verified: true,
            evidence: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_distribution_slices_sum_to_total() {
        let alerts: Vec<Alert> = [40, 99, 100, 480, 500, 999, 1000, 4500]
            .iter()
            .map(|&l| alert(l, Severity::Low, now()))
            .collect();

        let stats = VerificationStats::from_alerts(&alerts, 99.8);
        let d = &stats.latency_distribution;

        assert_eq!(d.under_100, 2);
        assert_eq!(d.under_500, 4);
        assert_eq!(d.under_1000, 6);
        assert_eq!(d.over_1000, 2);

        let reconstructed =
            d.under_100 + (d.under_500 - d.under_100) + (d.under_1000 - d.under_500) + d.over_1000;
        assert_eq!(reconstructed, stats.total_alerts);
        assert_eq!(stats.sub_second_alerts, 6);
    }

    #[test]
    fn test_severity_breakdown() {
        let alerts = vec![
            alert(10, Severity::Critical, now()),
            alert(20, Severity::High, now()),
            alert(30, Severity::High, now()),
            alert(40, Severity::Low, now()),
        ];
        let stats = VerificationStats::from_alerts(&alerts, 99.8);
        assert_eq!(stats.severity_breakdown.critical, 1);
        assert_eq!(stats.severity_breakdown.high, 2);
        assert_eq!(stats.severity_breakdown.medium, 0);
        assert_eq!(stats.severity_breakdown.low, 1);
    }

    #[test]
    fn test_empty_alert_set() {
        let stats = VerificationStats::from_alerts(&[], 99.8);
        assert_eq!(stats.total_alerts, 0);
        assert_eq!(stats.avg_latency_ms, 0);
        assert_eq!(stats.latency_distribution, LatencyDistribution::default());
    }

    #[test]
    fn test_avg_latency() {
        let alerts = vec![
            alert(100, Severity::Low, now()),
            alert(300, Severity::Low, now()),
        ];
        let stats = VerificationStats::from_alerts(&alerts, 99.8);
        assert_eq!(stats.avg_latency_ms, 200);
    }

    #[test]
    fn test_hourly_counts_buckets() {
        let alerts = vec![
            alert(100, Severity::Low, now() - Duration::minutes(30)),
            alert(300, Severity::Low, now() - Duration::minutes(45)),
            alert(500, Severity::Low, now() - Duration::hours(2)),
        ];

        let buckets = hourly_counts(&alerts, now(), 24);
        assert_eq!(buckets.len(), 24);

        // Newest bucket is last.
        let newest = &buckets[23];
        assert_eq!(newest.alerts, 2);
        assert_eq!(newest.avg_latency_ms, 200);

        let two_hours_back = &buckets[21];
        assert_eq!(two_hours_back.alerts, 1);
        assert_eq!(two_hours_back.avg_latency_ms, 500);

        let total: u64 = buckets.iter().map(|b| b.alerts).sum();
        assert_eq!(total, 3);
    }
}
