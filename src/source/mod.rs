pub mod rpc;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::time::Duration;

/// A decoded ERC-20/native Transfer event within a fetch window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub contract: Address,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: u64,
    pub tx_hash: B256,
    pub block_hash: B256,
}

/// Which side of the Transfer topic filter to pin to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSide {
    Any,
    Sender(Address),
    Recipient(Address),
}

/// Result of one log fetch: decoded events plus how many raw logs
/// were malformed and skipped.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub events: Vec<TransferEvent>,
    pub skipped_logs: usize,
}

/// Snapshot of upstream reachability taken by a single probe round-trip.
#[derive(Debug, Clone)]
pub struct NetworkProbe {
    pub block_height: u64,
    pub gas_price: u128,
    pub latency_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("upstream RPC unavailable: {0}")]
    Unavailable(String),
    #[error("upstream RPC timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid block range: from {from} > to {to}")]
    InvalidRange { from: u64, to: u64 },
}

impl SourceError {
    /// Whether the caller should switch to the synthetic fallback
    /// instead of rejecting the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Read-only adapter over the chain RPC. One instance is constructed at
/// startup and injected into the API state; tests substitute a scripted fake.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn latest_block_number(&self) -> Result<u64, SourceError>;

    /// Fetch Transfer logs for `[from_block, to_block]`, optionally pinned to
    /// one side of the transfer. Events come back in the node's order
    /// (non-decreasing block number), undeduplicated, possibly empty.
    async fn fetch_transfer_logs(
        &self,
        from_block: u64,
        to_block: u64,
        side: LogSide,
    ) -> Result<FetchReport, SourceError>;

    async fn native_balance(&self, address: Address) -> Result<U256, SourceError>;

    async fn probe(&self) -> Result<NetworkProbe, SourceError>;
}
