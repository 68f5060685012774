//! Block-Explorer Link Derivation

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Per-chain transaction URL prefixes, keyed by display chain name.
static EXPLORER_TX_PREFIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    // Torus Native (Substrate) has no public block explorer yet.
    HashMap::from([
        ("Base", "https://basescan.org/tx/"),
        ("Torus EVM", "https://blockscout.torus.network/tx/"),
    ])
});

/// Derive the explorer URL for a transaction on `chain_name`.
///
/// Unknown chain names yield an empty string rather than erroring.
pub fn explorer_url(tx_hash: &str, chain_name: &str) -> String {
    match EXPLORER_TX_PREFIXES.get(chain_name) {
        Some(prefix) => format!("{prefix}{tx_hash}"),
        None => String::new(),
    }
}
