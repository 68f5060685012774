//! Wallet Readiness Gate
//!
//! Pure predicates over wallet-connection snapshots supplied by the
//! wallet-provider collaborators. Nothing here talks to a wallet; the
//! snapshots are read-only inputs.

use serde::{Deserialize, Serialize};

use super::state::TransferDirection;

/// Point-in-time view of one wallet connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub is_connected: bool,
    pub is_connecting: bool,
    pub address: Option<String>,
    /// Active chain id. Only meaningful for the EVM wallet.
    pub chain_id: Option<u64>,
}

impl WalletSnapshot {
    pub fn connected(address: &str) -> Self {
        Self {
            is_connected: true,
            is_connecting: false,
            address: Some(address.to_string()),
            chain_id: None,
        }
    }

    pub fn with_chain(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

/// Snapshots of both wallets the bridge needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionState {
    pub native: WalletSnapshot,
    pub evm: WalletSnapshot,
}

/// The two EVM chain ids bridged to the native chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIds {
    pub base: u64,
    pub torus_evm: u64,
}

/// Chain the EVM wallet must end up on for a given direction.
///
/// BaseToNative starts on Base; NativeToBase finishes through Torus EVM.
#[inline]
pub fn required_chain_id(chains: &ChainIds, direction: TransferDirection) -> u64 {
    match direction {
        TransferDirection::BaseToNative => chains.base,
        TransferDirection::NativeToBase => chains.torus_evm,
    }
}

/// True iff the EVM wallet is connected on exactly the required chain.
pub fn is_on_required_chain(
    state: &ConnectionState,
    chains: &ChainIds,
    direction: TransferDirection,
) -> bool {
    state.evm.is_connected && state.evm.chain_id == Some(required_chain_id(chains, direction))
}

/// True iff a transfer in `direction` may begin.
///
/// Intentionally lenient on the exact EVM chain: either bridge chain is
/// acceptable, since the orchestrator performs any needed network switch
/// mid-flow. Both wallets must be connected regardless.
pub fn wallets_ready(
    state: &ConnectionState,
    chains: &ChainIds,
    _direction: TransferDirection,
) -> bool {
    let on_known_chain = matches!(
        state.evm.chain_id,
        Some(id) if id == chains.base || id == chains.torus_evm
    );
    state.native.is_connected && state.evm.is_connected && on_known_chain
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAINS: ChainIds = ChainIds {
        base: 8453,
        torus_evm: 21000,
    };

    fn ready_state(evm_chain: u64) -> ConnectionState {
        ConnectionState {
            native: WalletSnapshot::connected("5Grw...utQY"),
            evm: WalletSnapshot::connected("0x1234").with_chain(evm_chain),
        }
    }

    #[test]
    fn test_required_chain_id() {
        assert_eq!(
            required_chain_id(&CHAINS, TransferDirection::BaseToNative),
            8453
        );
        assert_eq!(
            required_chain_id(&CHAINS, TransferDirection::NativeToBase),
            21000
        );
    }

    #[test]
    fn test_is_on_required_chain() {
        let state = ready_state(8453);
        assert!(is_on_required_chain(
            &state,
            &CHAINS,
            TransferDirection::BaseToNative
        ));
        assert!(!is_on_required_chain(
            &state,
            &CHAINS,
            TransferDirection::NativeToBase
        ));
    }

    #[test]
    fn test_wallets_ready_lenient_on_chain() {
        // Either bridge chain is acceptable for either direction.
        for chain in [CHAINS.base, CHAINS.torus_evm] {
            let state = ready_state(chain);
            assert!(wallets_ready(
                &state,
                &CHAINS,
                TransferDirection::BaseToNative
            ));
            assert!(wallets_ready(
                &state,
                &CHAINS,
                TransferDirection::NativeToBase
            ));
        }
    }

    #[test]
    fn test_wallets_ready_rejects_unknown_chain() {
        let state = ready_state(1); // Ethereum mainnet, not a bridge chain
        assert!(!wallets_ready(
            &state,
            &CHAINS,
            TransferDirection::BaseToNative
        ));
    }

    #[test]
    fn test_wallets_ready_requires_both_connections() {
        let mut state = ready_state(CHAINS.base);
        state.native.is_connected = false;
        assert!(!wallets_ready(
            &state,
            &CHAINS,
            TransferDirection::BaseToNative
        ));

        let mut state = ready_state(CHAINS.base);
        state.evm.is_connected = false;
        assert!(!wallets_ready(
            &state,
            &CHAINS,
            TransferDirection::NativeToBase
        ));

        let mut state = ready_state(CHAINS.base);
        state.native.is_connected = false;
        state.evm.is_connected = false;
        assert!(!wallets_ready(
            &state,
            &CHAINS,
            TransferDirection::BaseToNative
        ));
    }
}
