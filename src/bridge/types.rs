//! Transaction Log Types & Amount Conversion
//!
//! The log holds at most one [`LegRecord`] per leg; recording a leg that is
//! already present replaces the prior record. The record for a leg is the
//! latest word on that leg, consistent with the current `TransferStep`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::error::BridgeError;

/// Decimal places of the TORUS token (1 TORUS = 10^18 rems).
pub const TORUS_DECIMALS: u32 = 18;

/// One of the two ordered sub-transfers composing a full bridge transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegId {
    Leg1,
    Leg2,
}

impl LegId {
    #[inline]
    pub fn number(&self) -> u8 {
        match self {
            LegId::Leg1 => 1,
            LegId::Leg2 => 2,
        }
    }
}

/// Coarse status of a leg as surfaced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// The leg has begun; wallet interaction and confirmation still ahead.
    Starting,
    /// The adapter call resolved and any confirmation wait finished.
    Success,
    /// The leg terminated the transfer.
    Error,
}

/// Progress record for one leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegRecord {
    pub leg: LegId,
    pub status: LegStatus,
    /// Chain the leg executes on, e.g. "Base", "Torus EVM", "Torus Native".
    pub chain_name: String,
    /// One-line human-readable progress or failure message.
    pub message: String,
    pub tx_hash: Option<String>,
    pub explorer_url: Option<String>,
    /// Formatted underlying error, present only on `Error` records.
    pub error_details: Option<String>,
}

impl LegRecord {
    pub fn starting(leg: LegId, chain_name: &str, message: &str) -> Self {
        Self {
            leg,
            status: LegStatus::Starting,
            chain_name: chain_name.to_string(),
            message: message.to_string(),
            tx_hash: None,
            explorer_url: None,
            error_details: None,
        }
    }

    pub fn success(leg: LegId, chain_name: &str, message: &str) -> Self {
        Self {
            leg,
            status: LegStatus::Success,
            chain_name: chain_name.to_string(),
            message: message.to_string(),
            tx_hash: None,
            explorer_url: None,
            error_details: None,
        }
    }

    pub fn error(leg: LegId, chain_name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            leg,
            status: LegStatus::Error,
            chain_name: chain_name.to_string(),
            message: message.to_string(),
            tx_hash: None,
            explorer_url: None,
            error_details: details,
        }
    }

    /// Attach the on-chain hash and derived explorer link.
    pub fn with_tx(mut self, tx_hash: Option<String>, explorer_url: Option<String>) -> Self {
        self.tx_hash = tx_hash;
        self.explorer_url = explorer_url;
        self
    }
}

/// Ordered collection of leg records, at most one per leg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionLog {
    records: Vec<LegRecord>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `record.leg`.
    pub fn record(&mut self, record: LegRecord) {
        match self.records.iter_mut().find(|r| r.leg == record.leg) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn get(&self, leg: LegId) -> Option<&LegRecord> {
        self.records.iter().find(|r| r.leg == leg)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn as_slice(&self) -> &[LegRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a user-entered decimal TORUS amount into integer rems.
///
/// Rejects empty, malformed, non-positive, over-precise (more than 18
/// fractional digits) and overflowing inputs.
pub fn to_nano(amount: &str) -> Result<u128, BridgeError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::InvalidAmount("amount is empty".to_string()));
    }

    let value: Decimal = trimmed
        .parse()
        .map_err(|_| BridgeError::InvalidAmount(format!("not a decimal number: {trimmed:?}")))?;

    if value.is_sign_negative() || value.is_zero() {
        return Err(BridgeError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    if value.scale() > TORUS_DECIMALS {
        return Err(BridgeError::InvalidAmount(format!(
            "more than {TORUS_DECIMALS} decimal places"
        )));
    }

    let scale = Decimal::from(10u64.pow(TORUS_DECIMALS));
    let rems = value
        .checked_mul(scale)
        .and_then(|scaled| scaled.to_u128())
        .ok_or_else(|| BridgeError::InvalidAmount("amount too large".to_string()))?;

    Ok(rems)
}
