//! JSON-RPC chain backend
//!
//! Talks to a development node over HTTP. Accounts come from the node's
//! own unlocked keyring via `eth_accounts`, so transfers go out as
//! `eth_sendTransaction` and the node signs them itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, TransactionRequest as EthTransactionRequest, H256};

use crate::chain::{
    StatusResolver, TransferCall, TransferReceipt, TransferRequest, TxStatus, WalletProvider,
};
use crate::error::{SwapError, SwapResult};

/// Receipt polling interval for pending transactions
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connect to a node, sharing one provider across all capabilities
pub fn connect(url: &str) -> SwapResult<Arc<Provider<Http>>> {
    let provider = Provider::<Http>::try_from(url)
        .map_err(|e| SwapError::Config(format!("invalid RPC URL {}: {}", url, e)))?
        .interval(POLL_INTERVAL);
    Ok(Arc::new(provider))
}

pub struct RpcWallet {
    provider: Arc<Provider<Http>>,
}

impl RpcWallet {
    pub fn new(provider: Arc<Provider<Http>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> SwapResult<Vec<String>> {
        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(|e| SwapError::WalletUnavailable(format!("eth_accounts failed: {}", e)))?;

        Ok(accounts.iter().map(|a| format!("{:?}", a)).collect())
    }
}

pub struct RpcTransfer {
    provider: Arc<Provider<Http>>,
}

impl RpcTransfer {
    pub fn new(provider: Arc<Provider<Http>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TransferCall for RpcTransfer {
    async fn send(&self, request: &TransferRequest) -> SwapResult<TransferReceipt> {
        let from: Address = request.from.parse().map_err(|e| {
            SwapError::Transfer(format!("invalid sender address {}: {}", request.from, e))
        })?;
        let to: Address = request.to.parse().map_err(|e| {
            SwapError::Transfer(format!("invalid destination address {}: {}", request.to, e))
        })?;

        let tx = EthTransactionRequest::new()
            .from(from)
            .to(to)
            .value(request.value);

        let pending = self
            .provider
            .send_transaction(tx, None)
            .await
            .map_err(|e| SwapError::Transfer(format!("transaction submission failed: {}", e)))?;

        let receipt = pending
            .await
            .map_err(|e| SwapError::Transfer(format!("failed while awaiting receipt: {}", e)))?
            .ok_or_else(|| SwapError::Transfer("transaction dropped from the mempool".to_string()))?;

        if receipt.status != Some(1.into()) {
            return Err(SwapError::Transfer(format!(
                "transaction {:?} reverted",
                receipt.transaction_hash
            )));
        }

        Ok(TransferReceipt {
            transaction_hash: format!("{:?}", receipt.transaction_hash),
        })
    }
}

pub struct RpcStatus {
    provider: Arc<Provider<Http>>,
}

impl RpcStatus {
    pub fn new(provider: Arc<Provider<Http>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl StatusResolver for RpcStatus {
    /// Resolve a hash against the node's receipt store
    ///
    /// Text that does not parse as a hash is reported as pending rather
    /// than rejected; a missing receipt means the same thing.
    async fn check_status(&self, hash: &str) -> SwapResult<TxStatus> {
        let parsed: H256 = match hash.parse() {
            Ok(h) => h,
            Err(_) => return Ok(TxStatus::Pending),
        };

        let receipt = self
            .provider
            .get_transaction_receipt(parsed)
            .await
            .map_err(|e| SwapError::Status(format!("receipt lookup failed: {}", e)))?;

        Ok(match receipt {
            None => TxStatus::Pending,
            Some(r) if r.status == Some(1.into()) => TxStatus::Success,
            Some(_) => TxStatus::Failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_accepts_http_url() {
        assert!(connect("http://localhost:8545").is_ok());
    }

    #[test]
    fn connect_rejects_garbage() {
        assert!(matches!(
            connect("::not a url::"),
            Err(SwapError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unparseable_hash_reports_pending_without_rpc_call() {
        let status = RpcStatus::new(connect("http://localhost:8545").unwrap());
        assert_eq!(
            status.check_status("not-a-hash").await.unwrap(),
            TxStatus::Pending
        );
    }
}
