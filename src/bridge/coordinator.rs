//! Bridge Transfer Coordinator
//!
//! Drives the two legs of a bridge transfer in order, translating every
//! leg-scoped failure into observable state instead of returning it: after
//! the preconditions pass, `execute_transfer` always resolves `Ok` and
//! callers watch `state().step` and the transaction log.
//!
//! A retry is a fresh `execute_transfer` call and always restarts from
//! leg 1, even when leg 1 had already succeeded. Leg 2 never starts before
//! leg 1's adapter call has resolved successfully.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::adapters::{ChainGateway, FinalityEvent, FinalityTracker, WarpRoute};
use super::error::{BridgeError, GatewayError, LegFailure, LegFailureKind};
use super::explorer::explorer_url;
use super::state::{BridgeTransferState, TransferDirection, TransferStep};
use super::types::{LegId, LegRecord, TransactionLog, to_nano};
use super::wallet::ConnectionState;
use crate::config::BridgeConfig;

/// Display names used in leg records and explorer lookups.
pub const CHAIN_BASE: &str = "Base";
pub const CHAIN_TORUS_EVM: &str = "Torus EVM";
pub const CHAIN_TORUS_NATIVE: &str = "Torus Native";

/// Clears the busy flag when an attempt ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-attempt context captured at entry, immutable for the attempt.
struct Attempt {
    amount: String,
    amount_rems: u128,
    evm_address: String,
    native_address: String,
    /// EVM wallet chain id at entry; may go stale after a mid-flow switch.
    evm_chain_id: Option<u64>,
}

/// How a leg learns that its transfer has landed.
///
/// Event-based finality (native chain) and awaited receipt/balance checks
/// (EVM chains) go through the same seam so the leg protocol does not fork
/// per chain type. Only finality errors are fatal; receipt and balance
/// failures are observability gaps, not correctness gaps, because the
/// transfer already happened on-chain once the adapter call resolved.
enum LegCompletion {
    Finality(FinalityTracker),
    Receipt { tx_hash: String },
    BalanceRefetch { chain_id: u64 },
}

/// The cross-chain transfer orchestrator.
///
/// Owns the transfer state and the transaction log; everything else reads
/// snapshots. One transfer runs at a time, enforced by an atomic busy flag.
pub struct BridgeCoordinator {
    gateway: Arc<dyn ChainGateway>,
    config: BridgeConfig,
    state: Mutex<BridgeTransferState>,
    log: Mutex<TransactionLog>,
    busy: AtomicBool,
}

impl BridgeCoordinator {
    pub fn new(gateway: Arc<dyn ChainGateway>, config: BridgeConfig) -> Self {
        Self {
            gateway,
            config,
            state: Mutex::new(BridgeTransferState::default()),
            log: Mutex::new(TransactionLog::new()),
            busy: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current transfer state.
    pub fn state(&self) -> BridgeTransferState {
        self.state.lock().unwrap().clone()
    }

    /// Snapshot of the transaction log, ordered by leg start.
    pub fn transactions(&self) -> Vec<LegRecord> {
        self.log.lock().unwrap().as_slice().to_vec()
    }

    /// True while a transfer attempt is between start and a terminal step.
    pub fn is_transfer_in_progress(&self) -> bool {
        self.state.lock().unwrap().step.is_in_progress()
    }

    /// Restore the initial state and clear the log.
    ///
    /// Does not cancel an in-flight adapter call; there is no cancellation
    /// token threaded through the leg protocol.
    pub fn reset_transfer(&self) {
        *self.state.lock().unwrap() = BridgeTransferState::default();
        self.log.lock().unwrap().clear();
        debug!("bridge state reset");
    }

    /// Run a full two-leg transfer.
    ///
    /// The caller is expected to have checked [`wallets_ready`] already;
    /// this re-validates that both wallet handles exist and fails fast
    /// before mutating anything. After that point all failures surface
    /// through the state and log, never through the return value.
    ///
    /// [`wallets_ready`]: super::wallet::wallets_ready
    pub async fn execute_transfer(
        &self,
        direction: TransferDirection,
        amount: &str,
        wallets: &ConnectionState,
    ) -> Result<(), BridgeError> {
        if !wallets.native.is_connected || !wallets.evm.is_connected {
            return Err(BridgeError::WalletsNotConnected);
        }
        let (Some(native_address), Some(evm_address)) =
            (wallets.native.address.clone(), wallets.evm.address.clone())
        else {
            return Err(BridgeError::WalletsNotConnected);
        };
        let amount_rems = to_nano(amount)?;

        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::TransferInProgress);
        }
        let _busy = BusyGuard(&self.busy);

        // Fresh attempt: even a retry after a leg-2 failure restarts from
        // leg 1.
        *self.state.lock().unwrap() = BridgeTransferState {
            step: TransferStep::Idle,
            direction: Some(direction),
            amount: amount.to_string(),
            error_message: None,
            error: None,
        };
        self.log.lock().unwrap().clear();

        info!(direction = %direction, amount, "starting bridge transfer");

        let attempt = Attempt {
            amount: amount.to_string(),
            amount_rems,
            evm_address,
            native_address,
            evm_chain_id: wallets.evm.chain_id,
        };

        let outcome = match direction {
            TransferDirection::BaseToNative => self.run_base_to_native(&attempt).await,
            TransferDirection::NativeToBase => self.run_native_to_base(&attempt).await,
        };

        match outcome {
            Ok(()) => info!(direction = %direction, "bridge transfer complete"),
            Err(failure) => warn!(
                leg = failure.leg.number(),
                kind = failure.kind.as_str(),
                "bridge transfer failed: {}",
                failure.message
            ),
        }

        Ok(())
    }

    // ========================================================================
    // Direction flows
    // ========================================================================

    /// Base TORUS -> Torus EVM (warp), then Torus EVM -> Native (withdrawal).
    async fn run_base_to_native(&self, attempt: &Attempt) -> Result<(), LegFailure> {
        // ---- Leg 1: warp transfer Base -> Torus EVM ----
        self.set_step(TransferStep::Step1Preparing);
        self.record(LegRecord::starting(
            LegId::Leg1,
            CHAIN_BASE,
            "Preparing Base → Torus EVM transfer",
        ));

        self.ensure_evm_chain(
            LegId::Leg1,
            CHAIN_BASE,
            attempt.evm_chain_id,
            self.config.base_chain_id,
            None,
        )
        .await?;

        self.set_step(TransferStep::Step1Signing);
        self.record(LegRecord::starting(
            LegId::Leg1,
            CHAIN_BASE,
            "Signing transaction...",
        ));
        let route = WarpRoute {
            origin: "base",
            destination: "torus",
            token_index: 0,
            amount: attempt.amount.clone(),
            recipient: attempt.evm_address.clone(),
        };
        let tx_hash = match self.gateway.cross_chain_transfer(route).await {
            Ok(hash) => hash,
            Err(e) => {
                return Err(self.fail_gateway(
                    LegId::Leg1,
                    CHAIN_BASE,
                    e,
                    "Transaction rejected by user",
                    "Failed to execute Base → Torus EVM transfer",
                ));
            }
        };

        self.set_step(TransferStep::Step1Confirming);
        let link = tx_hash.as_deref().map(|h| explorer_url(h, CHAIN_BASE));
        self.record(
            LegRecord::starting(LegId::Leg1, CHAIN_BASE, "Waiting for confirmation...")
                .with_tx(tx_hash.clone(), link.clone()),
        );
        // Funds land on the intermediate chain; refresh its balance before
        // leg 2 starts.
        self.await_leg_completion(
            LegId::Leg1,
            CHAIN_BASE,
            LegCompletion::BalanceRefetch {
                chain_id: self.config.torus_evm_chain_id,
            },
        )
        .await?;

        self.set_step(TransferStep::Step1Complete);
        self.record(
            LegRecord::success(LegId::Leg1, CHAIN_BASE, "Transfer complete")
                .with_tx(tx_hash, link),
        );

        // ---- Leg 2: withdrawal Torus EVM -> native wallet ----
        self.set_step(TransferStep::Step2Preparing);
        self.record(LegRecord::starting(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            "Preparing Torus EVM → Native withdrawal",
        ));

        // The wallet sat on Base for leg 1, so assume a switch is needed.
        self.ensure_evm_chain(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            None,
            self.config.torus_evm_chain_id,
            Some(TransferStep::Step2Switching),
        )
        .await?;

        self.set_step(TransferStep::Step2Signing);
        self.record(LegRecord::starting(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            "Signing transaction...",
        ));
        let withdraw_hash = match self
            .gateway
            .evm_withdraw(&attempt.native_address, attempt.amount_rems)
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                return Err(self.fail_gateway(
                    LegId::Leg2,
                    CHAIN_TORUS_EVM,
                    e,
                    "Withdrawal transaction rejected by user",
                    "Failed to withdraw from Torus EVM",
                ));
            }
        };

        self.set_step(TransferStep::Step2Confirming);
        let link = explorer_url(&withdraw_hash, CHAIN_TORUS_EVM);
        self.record(
            LegRecord::starting(LegId::Leg2, CHAIN_TORUS_EVM, "Waiting for confirmation...")
                .with_tx(Some(withdraw_hash.clone()), Some(link.clone())),
        );
        self.await_leg_completion(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            LegCompletion::Receipt {
                tx_hash: withdraw_hash.clone(),
            },
        )
        .await?;

        self.record(
            LegRecord::success(LegId::Leg2, CHAIN_TORUS_EVM, "Withdrawal complete")
                .with_tx(Some(withdraw_hash), Some(link)),
        );
        self.set_step(TransferStep::Complete);

        Ok(())
    }

    /// Native TORUS -> Torus EVM (finalized transfer), then Torus EVM ->
    /// Base (warp).
    async fn run_native_to_base(&self, attempt: &Attempt) -> Result<(), LegFailure> {
        // ---- Leg 1: native transfer to the EVM-derived SS58 account ----
        self.set_step(TransferStep::Step1Preparing);
        self.record(LegRecord::starting(
            LegId::Leg1,
            CHAIN_TORUS_NATIVE,
            "Preparing Native → Torus EVM bridge",
        ));

        let bridge_reserve = self.gateway.evm_to_ss58(&attempt.evm_address);

        self.set_step(TransferStep::Step1Signing);
        self.record(LegRecord::starting(
            LegId::Leg1,
            CHAIN_TORUS_NATIVE,
            "Signing transaction...",
        ));
        let submission = match self
            .gateway
            .native_transfer(&bridge_reserve, attempt.amount_rems)
            .await
        {
            Ok(submission) => submission,
            Err(e) => {
                return Err(self.fail_gateway(
                    LegId::Leg1,
                    CHAIN_TORUS_NATIVE,
                    e,
                    "Transaction rejected by user",
                    "Failed to bridge from Native to Torus EVM",
                ));
            }
        };

        self.set_step(TransferStep::Step1Confirming);
        // The native chain has no explorer; empty links are dropped.
        let link = submission
            .tx_hash
            .as_deref()
            .map(|h| explorer_url(h, CHAIN_TORUS_NATIVE))
            .filter(|link| !link.is_empty());
        self.record(
            LegRecord::starting(
                LegId::Leg1,
                CHAIN_TORUS_NATIVE,
                "Waiting for finalization...",
            )
            .with_tx(submission.tx_hash.clone(), link.clone()),
        );
        self.await_leg_completion(
            LegId::Leg1,
            CHAIN_TORUS_NATIVE,
            LegCompletion::Finality(submission.tracker),
        )
        .await?;

        self.set_step(TransferStep::Step1Complete);
        self.record(
            LegRecord::success(
                LegId::Leg1,
                CHAIN_TORUS_NATIVE,
                "Bridge complete - tokens arrived in Torus EVM",
            )
            .with_tx(submission.tx_hash.clone(), link),
        );

        // ---- Leg 2: warp transfer Torus EVM -> Base ----
        self.set_step(TransferStep::Step2Preparing);
        self.record(LegRecord::starting(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            "Preparing Torus EVM → Base transfer",
        ));

        self.ensure_evm_chain(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            attempt.evm_chain_id,
            self.config.torus_evm_chain_id,
            Some(TransferStep::Step2Switching),
        )
        .await?;

        self.set_step(TransferStep::Step2Signing);
        self.record(LegRecord::starting(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            "Signing transaction...",
        ));
        let route = WarpRoute {
            origin: "torus",
            destination: "base",
            token_index: 1,
            amount: attempt.amount.clone(),
            recipient: attempt.evm_address.clone(),
        };
        let tx_hash = match self.gateway.cross_chain_transfer(route).await {
            Ok(hash) => hash,
            Err(e) => {
                return Err(self.fail_gateway(
                    LegId::Leg2,
                    CHAIN_TORUS_EVM,
                    e,
                    "Transaction rejected by user",
                    "Failed to execute Torus EVM → Base transfer",
                ));
            }
        };

        self.set_step(TransferStep::Step2Confirming);
        let link = tx_hash.as_deref().map(|h| explorer_url(h, CHAIN_BASE));
        self.record(
            LegRecord::starting(LegId::Leg2, CHAIN_TORUS_EVM, "Waiting for confirmation...")
                .with_tx(tx_hash.clone(), link.clone()),
        );
        self.await_leg_completion(
            LegId::Leg2,
            CHAIN_TORUS_EVM,
            LegCompletion::BalanceRefetch {
                chain_id: self.config.base_chain_id,
            },
        )
        .await?;

        self.record(
            LegRecord::success(LegId::Leg2, CHAIN_BASE, "Transfer complete").with_tx(tx_hash, link),
        );
        self.set_step(TransferStep::Complete);

        Ok(())
    }

    // ========================================================================
    // Leg protocol helpers
    // ========================================================================

    fn set_step(&self, step: TransferStep) {
        let mut state = self.state.lock().unwrap();
        debug!(from = %state.step, to = %step, "step transition");
        state.step = step;
    }

    fn record(&self, record: LegRecord) {
        self.log.lock().unwrap().record(record);
    }

    /// Translate a leg failure into state: error step, messages, and an
    /// error record replacing the leg's current one.
    fn fail(
        &self,
        leg: LegId,
        chain_name: &str,
        message: &str,
        details: Option<String>,
        kind: LegFailureKind,
    ) -> LegFailure {
        let failure = LegFailure::new(leg, kind, message);
        self.record(LegRecord::error(leg, chain_name, message, details));

        let mut state = self.state.lock().unwrap();
        state.step = TransferStep::Error;
        state.error_message = Some(message.to_string());
        state.error = Some(failure.clone());

        failure
    }

    /// [`fail`](Self::fail) with the message picked by rejection vs fault.
    fn fail_gateway(
        &self,
        leg: LegId,
        chain_name: &str,
        err: GatewayError,
        rejected_message: &str,
        generic_message: &str,
    ) -> LegFailure {
        let message = if err.is_rejection() {
            rejected_message
        } else {
            generic_message
        };
        self.fail(
            leg,
            chain_name,
            message,
            Some(err.to_string()),
            err.failure_kind(),
        )
    }

    /// Drive the leg's completion signal. Only finality errors fail the
    /// leg; receipt and balance fetch problems are logged and swallowed.
    async fn await_leg_completion(
        &self,
        leg: LegId,
        chain_name: &str,
        completion: LegCompletion,
    ) -> Result<(), LegFailure> {
        match completion {
            LegCompletion::Finality(tracker) => match tracker.wait().await {
                FinalityEvent::Finalized => Ok(()),
                FinalityEvent::Error(cause) => Err(self.fail(
                    leg,
                    chain_name,
                    "Native bridge transaction failed",
                    Some(cause),
                    LegFailureKind::Finality,
                )),
            },
            LegCompletion::Receipt { tx_hash } => {
                if let Err(e) = self
                    .gateway
                    .await_receipt(&tx_hash, self.config.required_confirmations)
                    .await
                {
                    warn!(tx_hash = %tx_hash, error = %e, "failed to get transaction receipt");
                }
                Ok(())
            }
            LegCompletion::BalanceRefetch { chain_id } => {
                if let Err(e) = self.gateway.refetch_balance(chain_id).await {
                    warn!(chain_id, error = %e, "balance refetch failed");
                }
                Ok(())
            }
        }
    }

    /// Move the EVM wallet to `target` if it is not already there, with
    /// bounded retries. `switching_step` is entered while switching when
    /// the leg exposes one.
    async fn ensure_evm_chain(
        &self,
        leg: LegId,
        chain_name: &str,
        current: Option<u64>,
        target: u64,
        switching_step: Option<TransferStep>,
    ) -> Result<(), LegFailure> {
        if current == Some(target) {
            return Ok(());
        }

        if let Some(step) = switching_step {
            self.set_step(step);
            self.record(LegRecord::starting(
                leg,
                chain_name,
                "Switching network...",
            ));
        }

        let mut last_error: Option<GatewayError> = None;
        for attempt in 1..=self.config.max_switch_attempts {
            match self.gateway.switch_chain(target).await {
                Ok(id) if id == target => {
                    debug!(chain_id = target, attempt, "network switch confirmed");
                    return Ok(());
                }
                Ok(id) => {
                    warn!(expected = target, got = id, attempt, "chain id mismatch after switch");
                }
                Err(e) if e.is_rejection() => {
                    return Err(self.fail(
                        leg,
                        chain_name,
                        "Network switch was not accepted",
                        Some(e.to_string()),
                        LegFailureKind::Rejected,
                    ));
                }
                Err(e) => {
                    warn!(attempt, error = %e, "chain switch attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let message = format!("Unable to switch to {chain_name} network");
        Err(self.fail(
            leg,
            chain_name,
            &message,
            last_error.map(|e| e.to_string()),
            LegFailureKind::ChainSwitch,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::adapters::MockGateway;
    use crate::bridge::wallet::WalletSnapshot;

    fn coordinator() -> (Arc<MockGateway>, BridgeCoordinator) {
        let gateway = Arc::new(MockGateway::new());
        let coordinator = BridgeCoordinator::new(gateway.clone(), BridgeConfig::default());
        (gateway, coordinator)
    }

    fn connected_wallets() -> ConnectionState {
        ConnectionState {
            native: WalletSnapshot::connected("5Grw...utQY"),
            evm: WalletSnapshot::connected("0x1234").with_chain(8453),
        }
    }

    #[tokio::test]
    async fn test_precondition_wallets_not_connected() {
        let (gateway, coordinator) = coordinator();

        let mut wallets = connected_wallets();
        wallets.evm.is_connected = false;

        let result = coordinator
            .execute_transfer(TransferDirection::BaseToNative, "1", &wallets)
            .await;
        assert!(matches!(result, Err(BridgeError::WalletsNotConnected)));

        // No state mutation, no adapter calls.
        assert_eq!(coordinator.state().step, TransferStep::Idle);
        assert!(coordinator.transactions().is_empty());
        assert_eq!(gateway.cross_chain_count(), 0);
    }

    #[tokio::test]
    async fn test_precondition_missing_address() {
        let (_, coordinator) = coordinator();

        let mut wallets = connected_wallets();
        wallets.native.address = None;

        let result = coordinator
            .execute_transfer(TransferDirection::NativeToBase, "1", &wallets)
            .await;
        assert!(matches!(result, Err(BridgeError::WalletsNotConnected)));
    }

    #[tokio::test]
    async fn test_precondition_invalid_amount() {
        let (gateway, coordinator) = coordinator();

        let result = coordinator
            .execute_transfer(TransferDirection::BaseToNative, "nope", &connected_wallets())
            .await;
        assert!(matches!(result, Err(BridgeError::InvalidAmount(_))));
        assert_eq!(gateway.cross_chain_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let (_, coordinator) = coordinator();
        coordinator
            .execute_transfer(TransferDirection::BaseToNative, "1", &connected_wallets())
            .await
            .unwrap();
        assert_eq!(coordinator.state().step, TransferStep::Complete);

        for _ in 0..3 {
            coordinator.reset_transfer();
            let state = coordinator.state();
            assert_eq!(state.step, TransferStep::Idle);
            assert!(state.direction.is_none());
            assert!(state.amount.is_empty());
            assert!(state.error_message.is_none());
            assert!(coordinator.transactions().is_empty());
        }
    }

    #[tokio::test]
    async fn test_in_progress_is_derived_not_stored() {
        let (_, coordinator) = coordinator();
        assert!(!coordinator.is_transfer_in_progress());

        coordinator
            .execute_transfer(TransferDirection::BaseToNative, "1", &connected_wallets())
            .await
            .unwrap();
        // Terminal: not in progress even though a transfer just ran.
        assert!(!coordinator.is_transfer_in_progress());
    }
}
