pub mod rank;
pub mod stats;

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use crate::source::TransferEvent;

/// The burn/mint address, excluded from aggregation on both sides.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Per-address activity within one fetch window. Rebuilt on every request,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityRecord {
    pub tx_count: u64,
    pub counterparties: BTreeSet<Address>,
    pub last_seen_block: u64,
}

impl ActivityRecord {
    fn touch(&mut self, counterparty: Address, block_number: u64) {
        self.tx_count += 1;
        if counterparty != ZERO_ADDRESS {
            self.counterparties.insert(counterparty);
        }
        self.last_seen_block = self.last_seen_block.max(block_number);
    }

    /// Active-within-window predicate, a block-count proxy for "last 24h".
    pub fn is_active(&self, latest_block: u64, window_blocks: u64) -> bool {
        latest_block.saturating_sub(self.last_seen_block) < window_blocks
    }
}

/// Activity records for every address seen in a fetch window, with
/// first-sighting order retained so top-N ties break on fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityBook {
    records: HashMap<Address, ActivityRecord>,
    order: Vec<Address>,
}

impl ActivityBook {
    /// Fold a window of transfer events into per-address records. Each event
    /// counts once for its sender and once for its recipient; the zero
    /// address is never keyed and never recorded as a counterparty.
    pub fn from_events(events: &[TransferEvent]) -> Self {
        let mut book = Self::default();
        for event in events {
            if event.from != ZERO_ADDRESS {
                book.entry(event.from).touch(event.to, event.block_number);
            }
            if event.to != ZERO_ADDRESS {
                book.entry(event.to).touch(event.from, event.block_number);
            }
        }
        book
    }

    fn entry(&mut self, address: Address) -> &mut ActivityRecord {
        if !self.records.contains_key(&address) {
            self.order.push(address);
        }
        self.records.entry(address).or_default()
    }

    pub fn get(&self, address: &Address) -> Option<&ActivityRecord> {
        self.records.get(address)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in first-sighting order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = (&Address, &ActivityRecord)> {
        self.order
            .iter()
            .filter_map(|addr| self.records.get(addr).map(|rec| (addr, rec)))
    }
}

/// Single-wallet summary over a fetch window. Self-to-self events are
/// skipped; counterparties are always the other side of the transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletMetrics {
    pub address: Address,
    pub tx_count: u64,
    pub sent_count: u64,
    pub received_count: u64,
    pub counterparties: BTreeSet<Address>,
    pub last_seen_block: u64,
    /// Sum of transfer values touching this wallet, in human token units.
    pub volume: BigDecimal,
}

impl WalletMetrics {
    pub fn from_events(events: &[TransferEvent], address: Address, decimals: u8) -> Self {
        let mut metrics = Self {
            address,
            tx_count: 0,
            sent_count: 0,
            received_count: 0,
            counterparties: BTreeSet::new(),
            last_seen_block: 0,
            volume: BigDecimal::from(0),
        };

        for event in events {
            let outgoing = event.from == address;
            let incoming = event.to == address;
            if !outgoing && !incoming {
                continue;
            }
            if outgoing && incoming {
                // self-to-self
                continue;
            }

            metrics.tx_count += 1;
            if outgoing {
                metrics.sent_count += 1;
            } else {
                metrics.received_count += 1;
            }

            let other = if outgoing { event.to } else { event.from };
            if other != ZERO_ADDRESS {
                metrics.counterparties.insert(other);
            }

            metrics.last_seen_block = metrics.last_seen_block.max(event.block_number);
            metrics.volume += raw_to_human(&event.value.to_string(), decimals);
        }

        metrics
    }
}

/// Convert a raw integer amount (base-10 string) to human units.
pub fn raw_to_human(raw: &str, decimals: u8) -> BigDecimal {
    let amount = BigDecimal::from_str(raw).unwrap_or_else(|_| BigDecimal::from(0));
    let divisor = BigDecimal::from(10u128.pow(decimals as u32));
    amount / divisor
}
