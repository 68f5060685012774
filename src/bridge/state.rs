//! Bridge Transfer State Definitions
//!
//! The `TransferStep` enum is the state variable of the orchestrator FSM.
//! Steps advance strictly in order for a successful attempt; `Error` is an
//! absorbing state reachable from any non-terminal step.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::LegFailure;

/// Direction of a bridge transfer.
///
/// Fixed for the lifetime of one transfer attempt; set when the attempt starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferDirection {
    /// Base TORUS -> Torus EVM -> Native TORUS
    BaseToNative,
    /// Native TORUS -> Torus EVM -> Base TORUS
    NativeToBase,
}

impl TransferDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferDirection::BaseToNative => "base-to-native",
            TransferDirection::NativeToBase => "native-to-base",
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Orchestrator FSM states
///
/// ```text
/// IDLE → S1_PREPARING → S1_SIGNING → S1_CONFIRMING → S1_COMPLETE
///      → S2_PREPARING → [S2_SWITCHING] → S2_SIGNING → S2_CONFIRMING → COMPLETE
/// ```
///
/// plus a parallel absorbing `Error` state. `Idle` is initial; `Complete`
/// and `Error` are terminal for a given attempt (a new attempt restarts
/// from `Idle`). `Step2Switching` only occurs when the EVM wallet must
/// change networks before leg 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStep {
    Idle,
    #[serde(rename = "STEP_1_PREPARING")]
    Step1Preparing,
    #[serde(rename = "STEP_1_SIGNING")]
    Step1Signing,
    #[serde(rename = "STEP_1_CONFIRMING")]
    Step1Confirming,
    #[serde(rename = "STEP_1_COMPLETE")]
    Step1Complete,
    #[serde(rename = "STEP_2_PREPARING")]
    Step2Preparing,
    #[serde(rename = "STEP_2_SWITCHING")]
    Step2Switching,
    #[serde(rename = "STEP_2_SIGNING")]
    Step2Signing,
    #[serde(rename = "STEP_2_CONFIRMING")]
    Step2Confirming,
    Complete,
    Error,
}

impl TransferStep {
    /// Terminal for the current attempt (no further transitions possible).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStep::Complete | TransferStep::Error)
    }

    /// A transfer is in progress iff the step is neither `Idle` nor terminal.
    ///
    /// Always recomputed from the current step, never stored.
    #[inline]
    pub fn is_in_progress(&self) -> bool {
        !matches!(
            self,
            TransferStep::Idle | TransferStep::Complete | TransferStep::Error
        )
    }

    /// True once leg 1 has fully completed (its `Complete` marker or beyond).
    #[inline]
    pub fn leg1_completed(&self) -> bool {
        matches!(
            self,
            TransferStep::Step1Complete
                | TransferStep::Step2Preparing
                | TransferStep::Step2Switching
                | TransferStep::Step2Signing
                | TransferStep::Step2Confirming
                | TransferStep::Complete
        )
    }

    /// True while leg 1 is actively executing (its three sub-states).
    #[inline]
    pub fn leg1_active(&self) -> bool {
        matches!(
            self,
            TransferStep::Step1Preparing
                | TransferStep::Step1Signing
                | TransferStep::Step1Confirming
        )
    }

    /// True while leg 2 is actively executing.
    #[inline]
    pub fn leg2_active(&self) -> bool {
        matches!(
            self,
            TransferStep::Step2Preparing
                | TransferStep::Step2Switching
                | TransferStep::Step2Signing
                | TransferStep::Step2Confirming
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStep::Idle => "IDLE",
            TransferStep::Step1Preparing => "STEP_1_PREPARING",
            TransferStep::Step1Signing => "STEP_1_SIGNING",
            TransferStep::Step1Confirming => "STEP_1_CONFIRMING",
            TransferStep::Step1Complete => "STEP_1_COMPLETE",
            TransferStep::Step2Preparing => "STEP_2_PREPARING",
            TransferStep::Step2Switching => "STEP_2_SWITCHING",
            TransferStep::Step2Signing => "STEP_2_SIGNING",
            TransferStep::Step2Confirming => "STEP_2_CONFIRMING",
            TransferStep::Complete => "COMPLETE",
            TransferStep::Error => "ERROR",
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable state of one transfer attempt.
///
/// Owned exclusively by the coordinator; mutated only through its leg
/// protocol. Everything else (UI, readiness gate, tests) reads snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeTransferState {
    pub step: TransferStep,
    pub direction: Option<TransferDirection>,
    pub amount: String,
    /// Human-readable failure summary, set only when `step == Error`.
    pub error_message: Option<String>,
    /// Typed counterpart of `error_message` for observability and tests.
    pub error: Option<LegFailure>,
}

impl Default for BridgeTransferState {
    fn default() -> Self {
        Self {
            step: TransferStep::Idle,
            direction: None,
            amount: String::new(),
            error_message: None,
            error: None,
        }
    }
}
