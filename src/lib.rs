//! torus-bridge-core - Cross-Chain Transfer Orchestrator
//!
//! The coordination core of the Torus bridge: a two-leg transfer state
//! machine over opaque chain adapters, plus the wallet readiness gate and
//! the read-side transaction-log projection a frontend renders from.
//!
//! # Modules
//!
//! - [`bridge`] - Orchestrator: state machine, adapters, readiness gate,
//!   transaction log, lifecycle projection, explorer links
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup (rolling file + stdout)

pub mod bridge;
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use bridge::{
    BridgeCoordinator, BridgeError, BridgeTransferState, ChainGateway, ChainIds, ConnectionState,
    FinalityEvent, FinalitySender, FinalityTracker, GatewayError, LegFailure, LegFailureKind,
    LegId, LegProjection, LegRecord, LegStatus, NativeSubmission, StepStatus, TransactionLog,
    TransferDirection, TransferStep, WalletSnapshot, WarpRoute, explorer_url,
    is_on_required_chain, project, required_chain_id, to_nano, wallets_ready,
};
pub use config::{AppConfig, BridgeConfig};
pub use logging::init_logging;
