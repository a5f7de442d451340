use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};
use alloy::sol;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::future::IntoFuture;
use std::time::{Duration, Instant};

use crate::config::ChainConfig;

use super::{EventSource, FetchReport, LogSide, NetworkProbe, SourceError, TransferEvent};

// Generate the Transfer event ABI using alloy's sol! macro.
// This gives us Transfer::SIGNATURE_HASH and the canonical signature string.
sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Event source backed by an alloy HTTP provider. Every call is wrapped in
/// the configured timeout; a hung upstream surfaces as `SourceError::Timeout`.
pub struct RpcEventSource<P> {
    provider: P,
    timeout: Duration,
}

impl<P: Provider> RpcEventSource<P> {
    pub fn new(provider: P, config: &ChainConfig) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(config.rpc_timeout_secs),
        }
    }

    async fn bounded<T, E, F>(&self, fut: F) -> Result<T, SourceError>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(val)) => Ok(val),
            Ok(Err(e)) => Err(SourceError::Unavailable(e.to_string())),
            Err(_) => Err(SourceError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl<P: Provider> EventSource for RpcEventSource<P> {
    async fn latest_block_number(&self) -> Result<u64, SourceError> {
        self.bounded(self.provider.get_block_number()).await
    }

    async fn fetch_transfer_logs(
        &self,
        from_block: u64,
        to_block: u64,
        side: LogSide,
    ) -> Result<FetchReport, SourceError> {
        if from_block > to_block {
            return Err(SourceError::InvalidRange {
                from: from_block,
                to: to_block,
            });
        }

        let mut filter = Filter::new()
            .event(Transfer::SIGNATURE)
            .from_block(from_block)
            .to_block(to_block);

        match side {
            LogSide::Any => {}
            LogSide::Sender(addr) => filter = filter.topic1(addr.into_word()),
            LogSide::Recipient(addr) => filter = filter.topic2(addr.into_word()),
        }

        let logs = self.bounded(self.provider.get_logs(&filter)).await?;

        let mut report = FetchReport::default();
        for log in &logs {
            match decode_transfer_log(log) {
                Some(event) => report.events.push(event),
                None => report.skipped_logs += 1,
            }
        }

        if report.skipped_logs > 0 {
            tracing::debug!(
                skipped = report.skipped_logs,
                decoded = report.events.len(),
                "Skipped malformed transfer logs"
            );
        }

        Ok(report)
    }

    async fn native_balance(&self, address: Address) -> Result<U256, SourceError> {
        self.bounded(self.provider.get_balance(address)).await
    }

    async fn probe(&self) -> Result<NetworkProbe, SourceError> {
        let started = Instant::now();
        let (block_height, gas_price) = self
            .bounded(async {
                futures::try_join!(
                    self.provider.get_block_number(),
                    self.provider.get_gas_price()
                )
            })
            .await?;

        Ok(NetworkProbe {
            block_height,
            gas_price,
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Attempt to decode a log as an ERC-20 Transfer event.
///
/// Returns `None` if:
/// - The log doesn't match the Transfer event signature
/// - The topic or data layout is malformed
/// - The log carries no block number (pending log)
pub fn decode_transfer_log(log: &Log) -> Option<TransferEvent> {
    let inner = &log.inner;

    let topics = inner.data.topics();
    if topics.is_empty() || topics[0] != Transfer::SIGNATURE_HASH {
        return None;
    }

    // Exactly 3 topics (signature + from + to) and 32 bytes of data (value).
    if topics.len() != 3 {
        return None;
    }

    let from = Address::from_word(topics[1]);
    let to = Address::from_word(topics[2]);

    let data = inner.data.data.as_ref();
    if data.len() < 32 {
        return None;
    }
    let value = U256::from_be_slice(&data[..32]);

    let block_number = log.block_number?;

    Some(TransferEvent {
        contract: inner.address,
        from,
        to,
        value,
        block_number,
        tx_hash: log.transaction_hash.unwrap_or_default(),
        block_hash: log.block_hash.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, LogData, B256};

    fn transfer_log(from: Address, to: Address, value: U256, block: Option<u64>) -> Log {
        let topics = vec![
            Transfer::SIGNATURE_HASH,
            from.into_word(),
            to.into_word(),
        ];
        let data = Bytes::from(value.to_be_bytes::<32>().to_vec());
        Log {
            inner: alloy::primitives::Log {
                address: Address::repeat_byte(0xee),
                data: LogData::new_unchecked(topics, data),
            },
            block_number: block,
            block_hash: Some(B256::repeat_byte(0xbb)),
            transaction_hash: Some(B256::repeat_byte(0xcc)),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_transfer_log() {
        let from = Address::repeat_byte(0x01);
        let to = Address::repeat_byte(0x02);
        let log = transfer_log(from, to, U256::from(1500u64), Some(77));

        let event = decode_transfer_log(&log).expect("should decode");
        assert_eq!(event.from, from);
        assert_eq!(event.to, to);
        assert_eq!(event.value, U256::from(1500u64));
        assert_eq!(event.block_number, 77);
        assert_eq!(event.contract, Address::repeat_byte(0xee));
    }

    #[test]
    fn test_decode_rejects_wrong_signature() {
        let mut log = transfer_log(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            U256::from(1u64),
            Some(1),
        );
        let mut topics = log.inner.data.topics().to_vec();
        topics[0] = B256::repeat_byte(0xff);
        log.inner.data = LogData::new_unchecked(topics, log.inner.data.data.clone());
        assert!(decode_transfer_log(&log).is_none());
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let mut log = transfer_log(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            U256::from(1u64),
            Some(1),
        );
        log.inner.data = LogData::new_unchecked(
            log.inner.data.topics().to_vec(),
            Bytes::from(vec![0u8; 8]),
        );
        assert!(decode_transfer_log(&log).is_none());
    }

    #[test]
    fn test_decode_rejects_pending_log() {
        let log = transfer_log(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            U256::from(1u64),
            None,
        );
        assert!(decode_transfer_log(&log).is_none());
    }
}
