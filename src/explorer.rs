//! Seitrace URL builders for addresses and transactions.

pub fn seitrace_address(address: &str) -> String {
    format!("https://seitrace.com/address/{}?chain=pacific-1", address)
}

pub fn seitrace_tx(tx_hash: &str) -> String {
    format!("https://seitrace.com/tx/{}?chain=pacific-1", tx_hash)
}
