//! Retrying transfer submission
//!
//! One transfer gets a fixed attempt budget. Attempts run back to back
//! with no delay between them; the first success wins and the rest of
//! the budget goes unused.

use tracing::{debug, warn};

use crate::chain::{TransferCall, TransferReceipt, TransferRequest};
use crate::error::{SwapError, SwapResult};

/// Attempt budget used when configuration does not say otherwise
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Submit a transfer, retrying until the attempt budget runs out
///
/// A missing sender is a precondition failure and consumes no attempts.
pub async fn submit(
    call: &dyn TransferCall,
    request: &TransferRequest,
    max_attempts: u32,
) -> SwapResult<TransferReceipt> {
    if request.from.is_empty() {
        return Err(SwapError::WalletUnavailable(
            "no sender account available".to_string(),
        ));
    }

    for attempt in 1..=max_attempts {
        crate::metrics::record_transfer_attempt();

        match call.send(request).await {
            Ok(receipt) => {
                debug!(
                    "Transfer accepted on attempt {}/{} with hash {}",
                    attempt, max_attempts, receipt.transaction_hash
                );
                return Ok(receipt);
            }
            Err(e) => {
                warn!(
                    "Transfer attempt {}/{} failed: {}",
                    attempt, max_attempts, e
                );
            }
        }
    }

    Err(SwapError::RetryExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::types::U256;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times, then succeeds
    struct FlakyTransfer {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    impl FlakyTransfer {
        fn new(failures_before_success: u32) -> Self {
            Self {
                failures_before_success,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TransferCall for FlakyTransfer {
        async fn send(&self, _request: &TransferRequest) -> SwapResult<TransferReceipt> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(SwapError::Transfer("connection reset".to_string()))
            } else {
                Ok(TransferReceipt {
                    transaction_hash: format!("0xcall{}", call),
                })
            }
        }
    }

    fn request() -> TransferRequest {
        TransferRequest {
            from: "0x00a329c0648769a73afac7f9381e08fb43dbea72".to_string(),
            to: "0x1111111111111111111111111111111111111111".to_string(),
            value: U256::from(4u64),
        }
    }

    #[tokio::test]
    async fn first_attempt_success_uses_no_budget() {
        let call = FlakyTransfer::new(0);
        let receipt = submit(&call, &request(), 3).await.unwrap();
        assert_eq!(receipt.transaction_hash, "0xcall0");
        assert_eq!(call.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let call = FlakyTransfer::new(2);
        let receipt = submit(&call, &request(), 3).await.unwrap();
        assert_eq!(receipt.transaction_hash, "0xcall2");
        assert_eq!(call.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_reports_attempt_count() {
        let call = FlakyTransfer::new(u32::MAX);
        let err = submit(&call, &request(), 3).await.unwrap_err();
        assert!(matches!(err, SwapError::RetryExhausted { attempts: 3 }));
        assert_eq!(call.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn missing_sender_consumes_no_attempts() {
        let call = FlakyTransfer::new(0);
        let mut req = request();
        req.from = String::new();

        let err = submit(&call, &req, 3).await.unwrap_err();
        assert!(matches!(err, SwapError::WalletUnavailable(_)));
        assert_eq!(call.calls.load(Ordering::SeqCst), 0);
    }
}
