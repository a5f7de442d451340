use alloy::primitives::{address, Address};

/// A well-known token contract on Sei EVM (pacific-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownToken {
    pub symbol: &'static str,
    pub address: Address,
    pub decimals: u8,
}

/// Contracts the synthetic generator draws on for plausible alert evidence.
pub const KNOWN_TOKENS: [KnownToken; 3] = [
    KnownToken {
        symbol: "WSEI",
        address: address!("E30feDd158A2e3b13e9badaeABaFc5516e95e8C7"),
        decimals: 18,
    },
    KnownToken {
        symbol: "USDC",
        address: address!("3894085Ef7Ff0f0aeDf52E2A2704928d1Ec074F1"),
        decimals: 6,
    },
    KnownToken {
        symbol: "USDT",
        address: address!("B75D0B03c06A926e488e2659DF1A861F860bD3d1"),
        decimals: 6,
    },
];

pub fn by_symbol(symbol: &str) -> Option<&'static KnownToken> {
    KNOWN_TOKENS.iter().find(|t| t.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_symbol() {
        assert_eq!(by_symbol("WSEI").unwrap().decimals, 18);
        assert_eq!(by_symbol("USDC").unwrap().decimals, 6);
        assert!(by_symbol("DOGE").is_none());
    }

    #[test]
    fn test_addresses_distinct() {
        assert_ne!(KNOWN_TOKENS[0].address, KNOWN_TOKENS[1].address);
        assert_ne!(KNOWN_TOKENS[1].address, KNOWN_TOKENS[2].address);
    }
}
