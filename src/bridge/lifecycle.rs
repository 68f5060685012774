//! Transaction Lifecycle Projection
//!
//! Pure read-side view over `(TransferStep, &[LegRecord])` answering, per
//! leg, where it stands and what one line to show for it. Recomputable at
//! any time; nothing here is stored.

use serde::{Deserialize, Serialize};

use super::state::{TransferDirection, TransferStep};
use super::types::{LegId, LegRecord, LegStatus};

/// Display status of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not reached yet (or unreachable after an earlier failure).
    Pending,
    /// Currently executing.
    Active,
    /// Blocked behind the previous leg.
    Waiting,
    Completed,
    Error,
}

/// Projected view of one leg for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegProjection {
    pub leg: LegId,
    pub status: StepStatus,
    pub label: String,
    pub tx_hash: Option<String>,
    pub explorer_url: Option<String>,
    pub error_details: Option<String>,
}

fn leg_title(direction: TransferDirection, leg: LegId) -> &'static str {
    match (direction, leg) {
        (TransferDirection::BaseToNative, LegId::Leg1) => "Base → Torus EVM transfer",
        (TransferDirection::BaseToNative, LegId::Leg2) => "Torus EVM → Native withdrawal",
        (TransferDirection::NativeToBase, LegId::Leg1) => "Native → Torus EVM bridge",
        (TransferDirection::NativeToBase, LegId::Leg2) => "Torus EVM → Base transfer",
    }
}

/// Status in the absorbing `Error` state, shared by both legs: a leg that
/// already succeeded stays completed, the failed leg shows the error, and
/// anything not reached stays pending.
fn error_state_status(record: Option<&LegRecord>) -> StepStatus {
    match record.map(|r| r.status) {
        Some(LegStatus::Error) => StepStatus::Error,
        Some(LegStatus::Success) => StepStatus::Completed,
        _ => StepStatus::Pending,
    }
}

fn leg1_status(step: TransferStep, record: Option<&LegRecord>) -> StepStatus {
    if step == TransferStep::Error {
        return error_state_status(record);
    }
    if step.leg1_active() {
        return StepStatus::Active;
    }
    if step.leg1_completed() {
        return StepStatus::Completed;
    }
    StepStatus::Pending
}

fn leg2_status(step: TransferStep, record: Option<&LegRecord>) -> StepStatus {
    if step == TransferStep::Error {
        return error_state_status(record);
    }
    if step.leg2_active() {
        return StepStatus::Active;
    }
    if step == TransferStep::Complete {
        return StepStatus::Completed;
    }
    if step.leg1_active() || step == TransferStep::Step1Complete {
        return StepStatus::Waiting;
    }
    StepStatus::Pending
}

fn project_leg(
    direction: TransferDirection,
    leg: LegId,
    status: StepStatus,
    record: Option<&LegRecord>,
) -> LegProjection {
    let label = match (status, record) {
        (StepStatus::Waiting, _) => "Waiting for previous step".to_string(),
        (_, Some(rec)) => rec.message.clone(),
        (_, None) => leg_title(direction, leg).to_string(),
    };

    LegProjection {
        leg,
        status,
        label,
        tx_hash: record.and_then(|r| r.tx_hash.clone()),
        explorer_url: record.and_then(|r| r.explorer_url.clone()),
        error_details: record.and_then(|r| r.error_details.clone()),
    }
}

/// Project the per-leg display state from the FSM step and the log.
pub fn project(
    direction: TransferDirection,
    step: TransferStep,
    records: &[LegRecord],
) -> [LegProjection; 2] {
    let rec1 = records.iter().find(|r| r.leg == LegId::Leg1);
    let rec2 = records.iter().find(|r| r.leg == LegId::Leg2);

    [
        project_leg(direction, LegId::Leg1, leg1_status(step, rec1), rec1),
        project_leg(direction, LegId::Leg2, leg2_status(step, rec2), rec2),
    ]
}
