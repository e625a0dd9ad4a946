//! In-process simulated backend
//!
//! Runs the full swap path with no node attached. Transfer hashes are
//! minted from a submission counter, and status lookups derive a stable
//! answer from the hash text itself, so repeated checks of the same
//! hash always agree.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sha3::{Digest, Keccak256};

use crate::chain::{
    StatusResolver, TransferCall, TransferReceipt, TransferRequest, TxStatus, WalletProvider,
};
use crate::error::SwapResult;

pub struct SimulatedWallet {
    address: String,
}

impl SimulatedWallet {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn request_accounts(&self) -> SwapResult<Vec<String>> {
        if self.address.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![self.address.clone()])
    }
}

pub struct SimulatedTransfer {
    sequence: AtomicU64,
}

impl SimulatedTransfer {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl TransferCall for SimulatedTransfer {
    async fn send(&self, request: &TransferRequest) -> SwapResult<TransferReceipt> {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        let digest = Keccak256::digest(
            format!("{}:{}:{}:{}", n, request.from, request.to, request.value).as_bytes(),
        );

        Ok(TransferReceipt {
            transaction_hash: format!("0x{}", hex::encode(digest)),
        })
    }
}

pub struct SimulatedStatus;

impl SimulatedStatus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StatusResolver for SimulatedStatus {
    /// Map a hash to a stable pending/success answer via digest parity
    async fn check_status(&self, hash: &str) -> SwapResult<TxStatus> {
        let digest = Keccak256::digest(hash.as_bytes());
        Ok(if digest[0] % 2 == 0 {
            TxStatus::Success
        } else {
            TxStatus::Pending
        })
    }
}
