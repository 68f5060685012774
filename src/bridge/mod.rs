//! Cross-Chain Transfer Orchestrator
//!
//! Coordinates a two-leg token transfer between a wallet on the native
//! chain and a wallet on one of two EVM chains (Base or Torus EVM),
//! sequencing signatures, tracking per-leg status, and translating partial
//! failure into observable state.
//!
//! # State Machine
//!
//! ```text
//! IDLE → S1_PREPARING → S1_SIGNING → S1_CONFIRMING → S1_COMPLETE
//!      → S2_PREPARING → [S2_SWITCHING] → S2_SIGNING → S2_CONFIRMING → COMPLETE
//!              ↓ (any non-terminal step)
//!            ERROR
//! ```
//!
//! # Invariants
//!
//! 1. **Ordered legs**: leg 2's adapter call never begins before leg 1's
//!    adapter call has resolved successfully.
//! 2. **One record per leg**: the transaction log replaces, never appends,
//!    the record for a leg number.
//! 3. **Errors become state**: leg failures set `step = ERROR` and are never
//!    returned to the caller; only precondition and re-entrancy violations
//!    return `Err`.
//! 4. **Retry restarts at leg 1**: a repeat `execute_transfer` always runs
//!    the full two-leg sequence, even after a leg-2-only failure.

pub mod adapters;
pub mod coordinator;
pub mod error;
pub mod explorer;
pub mod lifecycle;
pub mod state;
pub mod types;
pub mod wallet;


// Re-exports for convenience
pub use adapters::{ChainGateway, FinalityEvent, FinalitySender, FinalityTracker, NativeSubmission, WarpRoute};
pub use coordinator::BridgeCoordinator;
pub use error::{BridgeError, GatewayError, LegFailure, LegFailureKind};
pub use explorer::explorer_url;
pub use lifecycle::{LegProjection, StepStatus, project};
pub use state::{BridgeTransferState, TransferDirection, TransferStep};
pub use types::{LegId, LegRecord, LegStatus, TransactionLog, to_nano};
pub use wallet::{
    ChainIds, ConnectionState, WalletSnapshot, is_on_required_chain, required_chain_id,
    wallets_ready,
};
