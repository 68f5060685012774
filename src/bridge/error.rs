//! Bridge Error Types
//!
//! Two error layers:
//!
//! - [`GatewayError`] — what a chain adapter call can fail with (rejection,
//!   transport, on-chain validation).
//! - [`LegFailure`] / [`BridgeError`] — what the orchestrator surfaces.
//!   Leg-scoped failures are translated into state, never rethrown; only
//!   precondition and re-entrancy violations are returned to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::LegId;

/// Errors returned directly by [`BridgeCoordinator::execute_transfer`].
///
/// These fire before any leg starts; no state mutation has occurred.
///
/// [`BridgeCoordinator::execute_transfer`]: super::coordinator::BridgeCoordinator::execute_transfer
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Wallets not properly connected")]
    WalletsNotConnected,

    #[error("A transfer is already in progress")]
    TransferInProgress,

    #[error("Invalid transfer amount: {0}")]
    InvalidAmount(String),
}

impl BridgeError {
    /// Stable error code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::WalletsNotConnected => "WALLETS_NOT_CONNECTED",
            BridgeError::TransferInProgress => "TRANSFER_IN_PROGRESS",
            BridgeError::InvalidAmount(_) => "INVALID_AMOUNT",
        }
    }
}

/// Classification of a leg-scoped failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegFailureKind {
    /// The user declined a signature or network-switch prompt.
    Rejected,
    /// The EVM wallet could not be moved to the required network.
    ChainSwitch,
    /// Transport/network failure or on-chain validation failure.
    Transport,
    /// The native finality tracker reported an error.
    Finality,
    /// Anything that escaped the typed paths.
    Unknown,
}

impl LegFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegFailureKind::Rejected => "REJECTED",
            LegFailureKind::ChainSwitch => "CHAIN_SWITCH",
            LegFailureKind::Transport => "TRANSPORT",
            LegFailureKind::Finality => "FINALITY",
            LegFailureKind::Unknown => "UNKNOWN",
        }
    }
}

/// Typed record of why a transfer attempt died.
///
/// Stored in [`BridgeTransferState`] next to the human-readable message so
/// observers do not have to string-match.
///
/// [`BridgeTransferState`]: super::state::BridgeTransferState
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("leg {} failed ({}): {message}", .leg.number(), .kind.as_str())]
pub struct LegFailure {
    pub leg: LegId,
    pub kind: LegFailureKind,
    pub message: String,
}

impl LegFailure {
    pub fn new(leg: LegId, kind: LegFailureKind, message: impl Into<String>) -> Self {
        Self {
            leg,
            kind,
            message: message.into(),
        }
    }
}

/// Adapter-boundary error.
///
/// The orchestrator never sees wallet or RPC internals, only this shape.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// User declined the wallet prompt.
    #[error("rejected by user: {0}")]
    Rejected(String),

    /// Network/transport failure submitting or tracking the operation.
    #[error("transport error: {0}")]
    Transport(String),

    /// The chain rejected the operation (nonce, balance, dust, ...).
    #[error("validation error: {0}")]
    Validation(String),
}

impl GatewayError {
    /// User rejections terminate the transfer but are not faults.
    #[inline]
    pub fn is_rejection(&self) -> bool {
        matches!(self, GatewayError::Rejected(_))
    }

    /// Map onto the leg-failure taxonomy.
    pub fn failure_kind(&self) -> LegFailureKind {
        match self {
            GatewayError::Rejected(_) => LegFailureKind::Rejected,
            GatewayError::Transport(_) | GatewayError::Validation(_) => LegFailureKind::Transport,
        }
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(e: anyhow::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}
