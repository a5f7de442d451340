use alloy::primitives::Address;

use super::ActivityBook;

/// A wallet selected for the leaderboard, decorated for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedWallet {
    pub address: Address,
    pub tx_count: u64,
    pub counterparties: usize,
    pub last_seen_block: u64,
    pub category: &'static str,
    pub risk_score: u64,
}

/// Select the `n` most active wallets. Sort is descending by transaction
/// count and stable, so equal counts keep first-sighting order.
pub fn top_n(book: &ActivityBook, n: usize) -> Vec<RankedWallet> {
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedWallet> = book
        .iter_in_order()
        .map(|(address, record)| RankedWallet {
            address: *address,
            tx_count: record.tx_count,
            counterparties: record.counterparties.len(),
            last_seen_block: record.last_seen_block,
            category: category(record.tx_count),
            risk_score: risk_score(record.tx_count),
        })
        .collect();

    ranked.sort_by(|a, b| b.tx_count.cmp(&a.tx_count));
    ranked.truncate(n);
    ranked
}

/// Rule table mapping activity volume to a display category.
pub fn category(tx_count: u64) -> &'static str {
    if tx_count > 100 {
        "DeFi Trader"
    } else if tx_count > 50 {
        "Active User"
    } else {
        "Casual User"
    }
}

/// Clamped heuristic score derived from activity volume alone.
pub fn risk_score(tx_count: u64) -> u64 {
    (60 + tx_count / 10).min(95)
}

/// Turn a block delta into a rough "time ago" label using the nominal
/// block time.
pub fn blocks_ago_label(latest_block: u64, last_seen_block: u64, block_time_ms: u64) -> String {
    let delta_ms = latest_block.saturating_sub(last_seen_block) * block_time_ms;
    let secs = delta_ms / 1000;

    if secs < 60 {
        return "just now".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }
    plural(hours / 24, "day")
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TransferEvent;
    use alloy::primitives::{B256, U256};

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn event(from: Address, to: Address, block: u64) -> TransferEvent {
        TransferEvent {
            contract: addr(0xee),
            from,
            to,
            value: U256::from(1u64),
            block_number: block,
            tx_hash: B256::ZERO,
            block_hash: B256::ZERO,
        }
    }

    fn book_of(events: &[TransferEvent]) -> ActivityBook {
        ActivityBook::from_events(events)
    }

    #[test]
    fn test_top_n_bounds() {
        let events = vec![event(addr(1), addr(2), 1), event(addr(3), addr(4), 2)];
        let book = book_of(&events);

        assert!(top_n(&book, 0).is_empty());
        assert_eq!(top_n(&book, 2).len(), 2);
        assert_eq!(top_n(&book, 100).len(), book.len());
    }

    #[test]
    fn test_top_n_stable_tiebreak() {
        // a and b both end up with tx_count 1 on each side; every address
        // ties, so output follows first-sighting order.
        let events = vec![event(addr(1), addr(2), 1), event(addr(3), addr(4), 2)];
        let ranked = top_n(&book_of(&events), 4);

        let order: Vec<Address> = ranked.iter().map(|w| w.address).collect();
        assert_eq!(order, vec![addr(1), addr(2), addr(3), addr(4)]);
    }

    #[test]
    fn test_top_n_sorts_descending() {
        let busy = addr(9);
        let mut events = vec![event(addr(1), addr(2), 1)];
        for block in 0..10 {
            events.push(event(busy, addr(3), block));
        }
        let ranked = top_n(&book_of(&events), 2);
        assert_eq!(ranked[0].address, busy);
        assert!(ranked[0].tx_count > ranked[1].tx_count);
    }

    #[test]
    fn test_category_thresholds() {
        assert_eq!(category(101), "DeFi Trader");
        assert_eq!(category(100), "Active User");
        assert_eq!(category(51), "Active User");
        assert_eq!(category(50), "Casual User");
        assert_eq!(category(0), "Casual User");
    }

    #[test]
    fn test_risk_score_clamp() {
        assert_eq!(risk_score(0), 60);
        assert_eq!(risk_score(100), 70);
        assert_eq!(risk_score(10_000), 95);
    }

    #[test]
    fn test_blocks_ago_label() {
        // 400ms blocks: 9000 blocks is an hour.
        assert_eq!(blocks_ago_label(100, 100, 400), "just now");
        assert_eq!(blocks_ago_label(1000, 100, 400), "6 minutes ago");
        assert_eq!(blocks_ago_label(9100, 100, 400), "1 hour ago");
        assert_eq!(blocks_ago_label(250_000, 100, 400), "1 day ago");
    }
}
