use chrono::{DateTime, Utc};
use serde_json::json;

use crate::alerts::types::Alert;
use crate::alerts::verification::VerificationStats;
use crate::explorer;

/// Fixed CSV column order for alert exports. Together with the JSON export
/// these round-trip every Alert field losslessly.
pub const CSV_COLUMNS: [&str; 14] = [
    "id",
    "type",
    "severity",
    "title",
    "address",
    "tx_hash",
    "block_number",
    "detected_at",
    "delivered_at",
    "latency_ms",
    "verified",
    "seitrace_url",
    "evidence_contract",
    "evidence_block_hash",
];

pub fn alerts_to_csv(alerts: &[Alert]) -> Result<String, eyre::Report> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;

    for alert in alerts {
        writer.write_record([
            alert.id.as_str(),
            alert.kind.as_str(),
            alert.severity.as_str(),
            alert.title.as_str(),
            alert.address.as_str(),
            alert.tx_hash.as_str(),
            &alert.block_number.to_string(),
            &alert.detected_at.to_rfc3339(),
            &alert.delivered_at.to_rfc3339(),
            &alert.latency_ms.to_string(),
            &alert.verified.to_string(),
            &explorer::seitrace_tx(&alert.tx_hash),
            alert
                .evidence
                .as_ref()
                .map(|e| e.contract.as_str())
                .unwrap_or(""),
            alert
                .evidence
                .as_ref()
                .map(|e| e.block_hash.as_str())
                .unwrap_or(""),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

/// JSON export envelope: the full alert entities plus summary stats.
pub fn alerts_to_json(
    alerts: &[Alert],
    stats: &VerificationStats,
    exported_at: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "metadata": {
            "export_date": exported_at.to_rfc3339(),
            "total_alerts": alerts.len(),
            "avg_latency_ms": stats.avg_latency_ms,
            "sub_second_alerts": stats.sub_second_alerts,
            "uptime_pct": stats.uptime_pct,
        },
        "stats": stats,
        "alerts": alerts,
    })
}
