//! Swap orchestration
//!
//! The engine owns the form state, the chain capabilities, and the
//! ledger, and runs the full swap path: look up a sender, snapshot the
//! form, convert the amount, submit with retries, record the outcome.

use std::sync::Arc;

use ethers::utils::parse_ether;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::chain::{
    Backends, StatusResolver, TransferCall, TransferRequest, TxStatus, WalletProvider,
};
use crate::error::{SwapError, SwapResult};
use crate::ledger::{Ledger, RecordStatus, TransactionRecord};
use crate::submit;
use crate::sync::SwapForm;

pub struct SwapEngine {
    wallet: Arc<dyn WalletProvider>,
    transfer: Arc<dyn TransferCall>,
    status: Arc<dyn StatusResolver>,
    ledger: Ledger,
    form: RwLock<SwapForm>,
    max_attempts: u32,
}

impl SwapEngine {
    pub fn new(backends: Backends, ledger: Ledger, max_attempts: u32) -> Self {
        Self {
            wallet: backends.wallet,
            transfer: backends.transfer,
            status: backends.status,
            ledger,
            form: RwLock::new(SwapForm::new()),
            max_attempts,
        }
    }

    /// Apply an edit to the amount field, returning the synced pair
    pub async fn set_amount(&self, raw: &str) -> (f64, f64) {
        let mut form = self.form.write().await;
        let accepted = form.set_amount(raw);
        crate::metrics::record_field_edit("amount", accepted);
        if accepted {
            debug!("Amount field set to {}", form.amount());
        }
        (form.amount(), form.price())
    }

    /// Apply an edit to the price field, returning the synced pair
    pub async fn set_price(&self, raw: &str) -> (f64, f64) {
        let mut form = self.form.write().await;
        let accepted = form.set_price(raw);
        crate::metrics::record_field_edit("price", accepted);
        if accepted {
            debug!("Price field set to {}", form.price());
        }
        (form.amount(), form.price())
    }

    /// Run one swap against the current form state
    ///
    /// The form is snapshotted once up front; edits that land while the
    /// transfer is in flight do not change what gets recorded. A swap
    /// that exhausts its retry budget still leaves a failure record
    /// behind before the error is returned.
    pub async fn swap(&self) -> SwapResult<TransactionRecord> {
        let result = self.execute_swap().await;
        if let Err(e) = &result {
            crate::metrics::record_swap_error(e.kind());
        }
        result
    }

    async fn execute_swap(&self) -> SwapResult<TransactionRecord> {
        let accounts = self.wallet.request_accounts().await?;
        let sender = accounts
            .first()
            .cloned()
            .ok_or_else(|| SwapError::WalletUnavailable("wallet exposes no accounts".to_string()))?;

        let (amount, destination) = {
            let form = self.form.read().await;
            (form.amount(), form.destination().to_string())
        };

        let value = parse_ether(amount.to_string()).map_err(|e| {
            SwapError::Validation(format!("amount {} does not convert to wei: {}", amount, e))
        })?;

        let request = TransferRequest {
            from: sender.clone(),
            to: destination.clone(),
            value,
        };

        info!("Submitting transfer of {} to {:?}", amount, destination);
        match submit::submit(self.transfer.as_ref(), &request, self.max_attempts).await {
            Ok(receipt) => {
                let record = TransactionRecord {
                    from: sender,
                    to: destination,
                    status: RecordStatus::Success,
                    amount: amount.to_string(),
                    transaction_hash: receipt.transaction_hash,
                };
                let records = self.ledger.append(record.clone()).await?;
                crate::metrics::record_swap_success();
                crate::metrics::record_ledger_records(records.len());
                info!(
                    "Swap of {} recorded with hash {}",
                    amount, record.transaction_hash
                );
                Ok(record)
            }
            Err(e) => {
                if matches!(e, SwapError::RetryExhausted { .. }) {
                    error!("Swap of {} gave up: {}", amount, e);
                    self.record_failure(sender, destination, amount).await;
                }
                Err(e)
            }
        }
    }

    /// Resolve the observed state of a transaction hash
    pub async fn check_status(&self, hash: &str) -> SwapResult<TxStatus> {
        match self.status.check_status(hash).await {
            Ok(status) => {
                crate::metrics::record_status_check(status.as_str());
                Ok(status)
            }
            Err(e) => {
                crate::metrics::record_status_check("unknown");
                Err(e)
            }
        }
    }

    /// All recorded swaps, oldest first
    pub async fn history(&self) -> Vec<TransactionRecord> {
        self.ledger.records().await
    }

    /// Best effort: a failed swap that cannot be recorded is only logged
    async fn record_failure(&self, from: String, to: String, amount: f64) {
        let record = TransactionRecord {
            from,
            to,
            status: RecordStatus::Fail,
            amount: amount.to_string(),
            transaction_hash: String::new(),
        };

        match self.ledger.append(record).await {
            Ok(records) => {
                crate::metrics::record_swap_failure();
                crate::metrics::record_ledger_records(records.len());
            }
            Err(e) => error!("Could not record failed swap: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{
        MockStatusResolver, MockTransferCall, MockWalletProvider, TransferReceipt,
    };

    const SENDER: &str = "0x00a329c0648769a73afac7f9381e08fb43dbea72";

    fn ready_wallet() -> MockWalletProvider {
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_request_accounts()
            .returning(|| Ok(vec![SENDER.to_string()]));
        wallet
    }

    async fn engine(
        dir: &tempfile::TempDir,
        wallet: MockWalletProvider,
        transfer: MockTransferCall,
        status: MockStatusResolver,
    ) -> SwapEngine {
        let ledger = Ledger::load(dir.path().join("history.json")).await;
        SwapEngine::new(
            Backends {
                wallet: Arc::new(wallet),
                transfer: Arc::new(transfer),
                status: Arc::new(status),
            },
            ledger,
            3,
        )
    }

    #[tokio::test]
    async fn swap_records_success_with_receipt_hash() {
        let dir = tempfile::tempdir().unwrap();

        let mut transfer = MockTransferCall::new();
        transfer
            .expect_send()
            .withf(|req| {
                req.from == SENDER && req.to == "10" && req.value == parse_ether("5").unwrap()
            })
            .returning(|_| {
                Ok(TransferReceipt {
                    transaction_hash: "0xabc".to_string(),
                })
            });

        let engine = engine(&dir, ready_wallet(), transfer, MockStatusResolver::new()).await;
        engine.set_price("10").await;
        engine.set_amount("5").await;

        let record = engine.swap().await.unwrap();
        assert_eq!(record.from, SENDER);
        assert_eq!(record.to, "10");
        assert_eq!(record.status, RecordStatus::Success);
        assert_eq!(record.amount, "5");
        assert_eq!(record.transaction_hash, "0xabc");

        let reloaded = Ledger::load(dir.path().join("history.json")).await;
        assert_eq!(reloaded.records().await, vec![record]);
    }

    #[tokio::test]
    async fn wallet_without_accounts_blocks_swap() {
        let dir = tempfile::tempdir().unwrap();

        let mut wallet = MockWalletProvider::new();
        wallet.expect_request_accounts().returning(|| Ok(Vec::new()));

        let mut transfer = MockTransferCall::new();
        transfer.expect_send().never();

        let engine = engine(&dir, wallet, transfer, MockStatusResolver::new()).await;
        engine.set_price("10").await;

        let err = engine.swap().await.unwrap_err();
        assert!(matches!(err, SwapError::WalletUnavailable(_)));
        assert!(engine.history().await.is_empty());
    }

    #[tokio::test]
    async fn exhausted_retries_leave_a_failure_record() {
        let dir = tempfile::tempdir().unwrap();

        let mut transfer = MockTransferCall::new();
        transfer
            .expect_send()
            .times(3)
            .returning(|_| Err(SwapError::Transfer("node unreachable".to_string())));

        let engine = engine(&dir, ready_wallet(), transfer, MockStatusResolver::new()).await;
        engine.set_price("10").await;
        engine.set_amount("4").await;

        let err = engine.swap().await.unwrap_err();
        assert!(matches!(err, SwapError::RetryExhausted { attempts: 3 }));

        let records = engine.history().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from, SENDER);
        assert_eq!(records[0].to, "10");
        assert_eq!(records[0].status, RecordStatus::Fail);
        assert_eq!(records[0].amount, "4");
        assert_eq!(records[0].transaction_hash, "");

        let reloaded = Ledger::load(dir.path().join("history.json")).await;
        assert_eq!(reloaded.records().await, records);
    }

    #[tokio::test]
    async fn nan_amount_fails_validation_before_submission() {
        let dir = tempfile::tempdir().unwrap();

        let mut transfer = MockTransferCall::new();
        transfer.expect_send().never();

        let engine = engine(&dir, ready_wallet(), transfer, MockStatusResolver::new()).await;
        engine.set_amount("0").await;
        let (amount, _) = engine.set_price("7").await;
        assert!(amount.is_nan());

        let err = engine.swap().await.unwrap_err();
        assert!(matches!(err, SwapError::Validation(_)));
        assert!(engine.history().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_edits_leave_the_pair_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(
            &dir,
            MockWalletProvider::new(),
            MockTransferCall::new(),
            MockStatusResolver::new(),
        )
        .await;

        assert_eq!(engine.set_amount("not a number").await, (1.0, 1.0));
        assert_eq!(engine.set_price("-5").await, (1.0, 1.0));
    }

    #[tokio::test]
    async fn status_checks_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();

        let mut status = MockStatusResolver::new();
        status
            .expect_check_status()
            .times(2)
            .returning(|_| Ok(TxStatus::Success));

        let engine = engine(
            &dir,
            MockWalletProvider::new(),
            MockTransferCall::new(),
            status,
        )
        .await;

        assert_eq!(
            engine.check_status("0xaaa").await.unwrap(),
            TxStatus::Success
        );
        assert_eq!(
            engine.check_status("0xaaa").await.unwrap(),
            TxStatus::Success
        );
    }

    #[tokio::test]
    async fn resolver_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();

        let mut status = MockStatusResolver::new();
        status
            .expect_check_status()
            .returning(|_| Err(SwapError::Status("receipt lookup failed".to_string())));

        let engine = engine(
            &dir,
            MockWalletProvider::new(),
            MockTransferCall::new(),
            status,
        )
        .await;

        let err = engine.check_status("0xaaa").await.unwrap_err();
        assert!(matches!(err, SwapError::Status(_)));
    }
}
