use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::stats::AggregateStats;
use crate::alerts::types::Alert;
use crate::alerts::verification::{
    HourlyBucket, LatencyDistribution, SeverityBreakdown, VerificationStats,
};

// ============================================================
// Hex conversion helpers
// ============================================================

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>, String> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(stripped).map_err(|e| format!("Invalid hex address: {}", e))
}

/// Parse a 20-byte hex address, with or without the 0x prefix.
pub fn parse_address(hex_str: &str) -> Result<Address, String> {
    let bytes = hex_to_bytes(hex_str)?;
    if bytes.len() != 20 {
        return Err(format!(
            "Invalid address length: expected 20 bytes, got {}",
            bytes.len()
        ));
    }
    Ok(Address::from_slice(&bytes))
}

// ============================================================
// Query params
// ============================================================

#[derive(Debug, Deserialize)]
pub struct TopWalletsParams {
    pub n: Option<usize>,
    /// Fetch window in blocks. Zero is rejected; oversized windows clamp to 5000.
    pub window: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct WalletParams {
    pub window: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AlertsParams {
    pub limit: Option<usize>,
    pub window: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub limit: Option<usize>,
}

// ============================================================
// Response envelope
// ============================================================

/// Where a payload's numbers came from. Fallback payloads share the exact
/// schema of live ones; this tag is the only difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Synthetic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub last_updated: DateTime<Utc>,
    pub data_source: String,
    pub blocks_analyzed: u64,
    pub latest_block: u64,
    /// Malformed log entries dropped during decoding (always 0 for synthetic).
    pub skipped_logs: usize,
    pub source: DataOrigin,
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub chain: String,
    pub chain_id: u64,
    pub rpc_reachable: bool,
    pub latest_block: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankedWalletEntry {
    pub address: String,
    pub tx_count: u64,
    pub counterparties: usize,
    pub last_activity: String,
    pub category: String,
    pub risk_score: u64,
    pub seitrace_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopWalletsResponse {
    pub wallets: Vec<RankedWalletEntry>,
    pub stats: AggregateStats,
    pub metadata: Meta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletSummaryResponse {
    pub address: String,
    pub balance: String,
    pub balance_formatted: String,
    pub tx_count: u64,
    pub sent_count: u64,
    pub received_count: u64,
    pub counterparties: u64,
    pub volume: String,
    pub category: String,
    pub risk_score: u64,
    pub last_activity: String,
    pub seitrace_url: String,
    pub metadata: Meta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub metadata: Meta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationMetrics {
    pub latency_distribution: LatencyDistribution,
    pub severity_breakdown: SeverityBreakdown,
    pub hourly_stats: Vec<HourlyBucket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub stats: VerificationStats,
    pub metrics: VerificationMetrics,
    pub alerts: Vec<Alert>,
    pub metadata: Meta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkStatusResponse {
    pub chain_id: u64,
    pub block_height: u64,
    pub gas_price_wei: String,
    pub network_latency_ms: u64,
    pub rpc_status: String,
    pub last_checked: DateTime<Utc>,
    pub source: DataOrigin,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
