//! Chain Gateway Adapters
//!
//! The orchestrator's only view of the outside world. Wallet signing,
//! RPC transports and the warp (Hyperlane-style) messaging layer all sit
//! behind [`ChainGateway`]; each operation resolves after the external
//! wallet confirms signing and the transport accepts the transaction, or
//! rejects with a typed [`GatewayError`].

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::error::GatewayError;

/// Parameters of a warp (cross-chain message-passing) transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpRoute {
    /// Origin chain name, e.g. "base" or "torus".
    pub origin: &'static str,
    /// Destination chain name.
    pub destination: &'static str,
    /// Index of the token in the warp route config.
    pub token_index: u32,
    /// Decimal amount as entered by the user.
    pub amount: String,
    /// Recipient address on the destination chain.
    pub recipient: String,
}

/// Terminal event emitted by a native-chain finality tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalityEvent {
    /// The transaction was irreversibly included.
    Finalized,
    /// The transaction failed before finalization.
    Error(String),
}

/// One-shot handle notifying the orchestrator when a submitted
/// native-chain transaction reaches finality.
///
/// Emits exactly one [`FinalityEvent`]. A tracker whose sender stays alive
/// but silent will block [`wait`](Self::wait) indefinitely; a dropped
/// sender resolves as an error rather than hanging.
#[derive(Debug)]
pub struct FinalityTracker {
    rx: oneshot::Receiver<FinalityEvent>,
}

/// Sending half of a [`FinalityTracker`], held by the adapter.
#[derive(Debug)]
pub struct FinalitySender {
    tx: oneshot::Sender<FinalityEvent>,
}

impl FinalityTracker {
    pub fn channel() -> (FinalitySender, FinalityTracker) {
        let (tx, rx) = oneshot::channel();
        (FinalitySender { tx }, FinalityTracker { rx })
    }

    /// Wait for the terminal event.
    pub async fn wait(self) -> FinalityEvent {
        match self.rx.await {
            Ok(event) => event,
            Err(_) => FinalityEvent::Error("finality tracker dropped".to_string()),
        }
    }
}

impl FinalitySender {
    pub fn finalized(self) {
        let _ = self.tx.send(FinalityEvent::Finalized);
    }

    pub fn error(self, cause: impl Into<String>) {
        let _ = self.tx.send(FinalityEvent::Error(cause.into()));
    }
}

/// Result of submitting a native-chain transfer.
#[derive(Debug)]
pub struct NativeSubmission {
    /// Extrinsic hash when the transport reports one at submission time.
    pub tx_hash: Option<String>,
    pub tracker: FinalityTracker,
}

/// Opaque chain-client capability consumed by the coordinator.
///
/// Implementations wrap the chain SDK, the connected wallets and the warp
/// messaging layer. Submission methods must not resolve before the wallet
/// interaction completes.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Gateway name for logging.
    fn name(&self) -> &'static str;

    /// Submit a native-chain transfer of `amount_rems` to `dest_ss58`.
    ///
    /// Resolves once the transport accepts the extrinsic; finality arrives
    /// later through the returned tracker.
    async fn native_transfer(
        &self,
        dest_ss58: &str,
        amount_rems: u128,
    ) -> Result<NativeSubmission, GatewayError>;

    /// Withdraw `amount_rems` from Torus EVM to a native SS58 address.
    /// Returns the transaction hash.
    async fn evm_withdraw(&self, dest_ss58: &str, amount_rems: u128)
    -> Result<String, GatewayError>;

    /// Submit a warp transfer between two EVM chains.
    ///
    /// The hash is optional: some warp transports do not surface one.
    async fn cross_chain_transfer(&self, route: WarpRoute) -> Result<Option<String>, GatewayError>;

    /// Wait for `confirmations` confirmations of an EVM transaction.
    ///
    /// Best-effort observability step: the coordinator logs failures here
    /// but never fails a leg on them.
    async fn await_receipt(&self, tx_hash: &str, confirmations: u32) -> Result<(), GatewayError>;

    /// Ask the EVM wallet to switch networks. Returns the chain id the
    /// wallet reports afterwards, which callers must verify.
    async fn switch_chain(&self, chain_id: u64) -> Result<u64, GatewayError>;

    /// Refetch the bridged-token balance on `chain_id`. Best-effort.
    async fn refetch_balance(&self, chain_id: u64) -> Result<u128, GatewayError>;

    /// Derive the SS58 account mapped to an EVM (H160) address.
    ///
    /// Pure chain-SDK derivation, supplied here so the coordinator stays
    /// free of codec dependencies.
    fn evm_to_ss58(&self, evm_address: &str) -> String;
}

/// Mock gateway for testing the coordinator without wallets or chains.
#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Observer fired at the start of every gateway call with the
    /// operation name. Lets tests snapshot coordinator state mid-flight.
    type CallHook = Arc<dyn Fn(&'static str) + Send + Sync>;

    /// Scripted outcome for the native finality tracker.
    #[derive(Debug, Clone)]
    pub enum FinalityScript {
        Finalize,
        Fail(String),
        /// Drop the sender without emitting.
        Drop,
    }

    pub struct MockGateway {
        /// Configured behavior
        fail_native_transfer: Mutex<Option<GatewayError>>,
        fail_evm_withdraw: Mutex<Option<GatewayError>>,
        fail_cross_chain: Mutex<Option<GatewayError>>,
        fail_receipt: Mutex<bool>,
        fail_balance: Mutex<bool>,
        fail_switch: Mutex<Option<GatewayError>>,
        finality: Mutex<FinalityScript>,
        reported_chain_id: Mutex<Option<u64>>,
        /// Artificial latency on warp calls, for in-flight tests.
        cross_chain_delay: Mutex<Option<std::time::Duration>>,
        call_hook: Mutex<Option<CallHook>>,
        /// Call counters for verification
        native_transfer_count: AtomicUsize,
        evm_withdraw_count: AtomicUsize,
        cross_chain_count: AtomicUsize,
        receipt_count: AtomicUsize,
        switch_count: AtomicUsize,
        balance_count: AtomicUsize,
        /// Recorded warp routes
        routes: Mutex<Vec<WarpRoute>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self {
                fail_native_transfer: Mutex::new(None),
                fail_evm_withdraw: Mutex::new(None),
                fail_cross_chain: Mutex::new(None),
                fail_receipt: Mutex::new(false),
                fail_balance: Mutex::new(false),
                fail_switch: Mutex::new(None),
                finality: Mutex::new(FinalityScript::Finalize),
                reported_chain_id: Mutex::new(None),
                cross_chain_delay: Mutex::new(None),
                call_hook: Mutex::new(None),
                native_transfer_count: AtomicUsize::new(0),
                evm_withdraw_count: AtomicUsize::new(0),
                cross_chain_count: AtomicUsize::new(0),
                receipt_count: AtomicUsize::new(0),
                switch_count: AtomicUsize::new(0),
                balance_count: AtomicUsize::new(0),
                routes: Mutex::new(Vec::new()),
            }
        }

        pub fn set_fail_native_transfer(&self, err: GatewayError) {
            *self.fail_native_transfer.lock().unwrap() = Some(err);
        }

        pub fn set_fail_evm_withdraw(&self, err: GatewayError) {
            *self.fail_evm_withdraw.lock().unwrap() = Some(err);
        }

        pub fn set_fail_cross_chain(&self, err: GatewayError) {
            *self.fail_cross_chain.lock().unwrap() = Some(err);
        }

        pub fn set_fail_receipt(&self, fail: bool) {
            *self.fail_receipt.lock().unwrap() = fail;
        }

        pub fn set_fail_balance(&self, fail: bool) {
            *self.fail_balance.lock().unwrap() = fail;
        }

        pub fn set_fail_switch(&self, err: GatewayError) {
            *self.fail_switch.lock().unwrap() = Some(err);
        }

        pub fn set_finality(&self, script: FinalityScript) {
            *self.finality.lock().unwrap() = script;
        }

        /// Chain id reported by `switch_chain` regardless of the request.
        pub fn set_reported_chain_id(&self, chain_id: u64) {
            *self.reported_chain_id.lock().unwrap() = Some(chain_id);
        }

        pub fn set_cross_chain_delay(&self, delay: std::time::Duration) {
            *self.cross_chain_delay.lock().unwrap() = Some(delay);
        }

        pub fn set_call_hook<F>(&self, hook: F)
        where
            F: Fn(&'static str) + Send + Sync + 'static,
        {
            *self.call_hook.lock().unwrap() = Some(Arc::new(hook));
        }

        fn notify(&self, op: &'static str) {
            // Clone out so the hook runs without the lock held.
            let hook = self.call_hook.lock().unwrap().clone();
            if let Some(hook) = hook {
                hook(op);
            }
        }

        pub fn native_transfer_count(&self) -> usize {
            self.native_transfer_count.load(Ordering::SeqCst)
        }

        pub fn evm_withdraw_count(&self) -> usize {
            self.evm_withdraw_count.load(Ordering::SeqCst)
        }

        pub fn cross_chain_count(&self) -> usize {
            self.cross_chain_count.load(Ordering::SeqCst)
        }

        pub fn receipt_count(&self) -> usize {
            self.receipt_count.load(Ordering::SeqCst)
        }

        pub fn switch_count(&self) -> usize {
            self.switch_count.load(Ordering::SeqCst)
        }

        pub fn balance_count(&self) -> usize {
            self.balance_count.load(Ordering::SeqCst)
        }

        pub fn routes(&self) -> Vec<WarpRoute> {
            self.routes.lock().unwrap().clone()
        }
    }

    impl Default for MockGateway {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ChainGateway for MockGateway {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn native_transfer(
            &self,
            _dest_ss58: &str,
            _amount_rems: u128,
        ) -> Result<NativeSubmission, GatewayError> {
            self.notify("native_transfer");
            self.native_transfer_count.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_native_transfer.lock().unwrap().clone() {
                return Err(err);
            }

            let (sender, tracker) = FinalityTracker::channel();
            match self.finality.lock().unwrap().clone() {
                FinalityScript::Finalize => sender.finalized(),
                FinalityScript::Fail(cause) => sender.error(cause),
                FinalityScript::Drop => drop(sender),
            }

            Ok(NativeSubmission {
                tx_hash: Some("0xnative".to_string()),
                tracker,
            })
        }

        async fn evm_withdraw(
            &self,
            _dest_ss58: &str,
            _amount_rems: u128,
        ) -> Result<String, GatewayError> {
            self.notify("evm_withdraw");
            self.evm_withdraw_count.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_evm_withdraw.lock().unwrap().clone() {
                return Err(err);
            }
            Ok("0xwithdraw".to_string())
        }

        async fn cross_chain_transfer(
            &self,
            route: WarpRoute,
        ) -> Result<Option<String>, GatewayError> {
            self.notify("cross_chain_transfer");
            self.cross_chain_count.fetch_add(1, Ordering::SeqCst);
            self.routes.lock().unwrap().push(route);
            let delay = *self.cross_chain_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = self.fail_cross_chain.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(Some("0xwarp".to_string()))
        }

        async fn await_receipt(
            &self,
            _tx_hash: &str,
            _confirmations: u32,
        ) -> Result<(), GatewayError> {
            self.notify("await_receipt");
            self.receipt_count.fetch_add(1, Ordering::SeqCst);
            if *self.fail_receipt.lock().unwrap() {
                return Err(GatewayError::Transport("receipt unavailable".to_string()));
            }
            Ok(())
        }

        async fn switch_chain(&self, chain_id: u64) -> Result<u64, GatewayError> {
            self.notify("switch_chain");
            self.switch_count.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_switch.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(self.reported_chain_id.lock().unwrap().unwrap_or(chain_id))
        }

        async fn refetch_balance(&self, _chain_id: u64) -> Result<u128, GatewayError> {
            self.notify("refetch_balance");
            self.balance_count.fetch_add(1, Ordering::SeqCst);
            if *self.fail_balance.lock().unwrap() {
                return Err(GatewayError::Transport("balance refetch failed".to_string()));
            }
            Ok(0)
        }

        fn evm_to_ss58(&self, evm_address: &str) -> String {
            format!("ss58:{evm_address}")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_tracker_finalized() {
            let (sender, tracker) = FinalityTracker::channel();
            sender.finalized();
            assert_eq!(tracker.wait().await, FinalityEvent::Finalized);
        }

        #[tokio::test]
        async fn test_tracker_error() {
            let (sender, tracker) = FinalityTracker::channel();
            sender.error("block pruned");
            assert_eq!(
                tracker.wait().await,
                FinalityEvent::Error("block pruned".to_string())
            );
        }

        #[tokio::test]
        async fn test_tracker_dropped_sender() {
            let (sender, tracker) = FinalityTracker::channel();
            drop(sender);
            assert!(matches!(tracker.wait().await, FinalityEvent::Error(_)));
        }

        #[tokio::test]
        async fn test_mock_gateway_records_routes() {
            let gateway = MockGateway::new();
            let route = WarpRoute {
                origin: "base",
                destination: "torus",
                token_index: 0,
                amount: "10".to_string(),
                recipient: "0xabc".to_string(),
            };
            let hash = gateway.cross_chain_transfer(route.clone()).await.unwrap();
            assert!(hash.is_some());
            assert_eq!(gateway.routes(), vec![route]);
        }

        #[tokio::test]
        async fn test_mock_gateway_failure_flags() {
            let gateway = MockGateway::new();
            gateway.set_fail_evm_withdraw(GatewayError::Rejected("declined".to_string()));

            let result = gateway.evm_withdraw("ss58:abc", 1).await;
            assert!(matches!(result, Err(GatewayError::Rejected(_))));
            assert_eq!(gateway.evm_withdraw_count(), 1);
        }
    }
}

#[cfg(test)]
pub use mock::MockGateway;
