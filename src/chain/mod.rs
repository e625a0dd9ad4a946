//! Chain access
//!
//! Everything the orchestrator needs from a chain fits three narrow
//! capabilities: listing wallet accounts, sending one native transfer,
//! and checking a submitted hash. A JSON-RPC backend and an in-process
//! simulated backend both implement them; configuration decides which
//! one is wired in at startup.

pub mod rpc;
pub mod sim;

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Backend, ChainConfig};
use crate::error::SwapResult;

/// One native value transfer, ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub value: U256,
}

/// Proof that a transfer was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_hash: String,
}

/// Observed state of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
        }
    }
}

/// Source of accounts available for signing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// List the unlocked accounts, sender first
    async fn request_accounts(&self) -> SwapResult<Vec<String>>;
}

/// Submits one transfer and waits for its receipt
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferCall: Send + Sync {
    async fn send(&self, request: &TransferRequest) -> SwapResult<TransferReceipt>;
}

/// Looks up the current state of a transaction hash
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusResolver: Send + Sync {
    async fn check_status(&self, hash: &str) -> SwapResult<TxStatus>;
}

/// The three chain capabilities wired to one configured backend
pub struct Backends {
    pub wallet: Arc<dyn WalletProvider>,
    pub transfer: Arc<dyn TransferCall>,
    pub status: Arc<dyn StatusResolver>,
}

/// Build the backend set selected by configuration
pub fn build_backends(config: &ChainConfig) -> SwapResult<Backends> {
    match config.backend {
        Backend::Rpc => {
            info!("Using JSON-RPC chain backend at {}", config.rpc_url);
            let provider = rpc::connect(&config.rpc_url)?;
            Ok(Backends {
                wallet: Arc::new(rpc::RpcWallet::new(provider.clone())),
                transfer: Arc::new(rpc::RpcTransfer::new(provider.clone())),
                status: Arc::new(rpc::RpcStatus::new(provider)),
            })
        }
        Backend::Simulated => {
            info!("Using simulated chain backend");
            Ok(Backends {
                wallet: Arc::new(sim::SimulatedWallet::new(config.dev_address.clone())),
                transfer: Arc::new(sim::SimulatedTransfer::new()),
                status: Arc::new(sim::SimulatedStatus::new()),
            })
        }
    }
}
