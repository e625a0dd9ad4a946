//! Durable swap history
//!
//! Completed and failed swaps land in a single JSON file holding the
//! full record list. Every append rewrites the whole file, which keeps
//! the format trivially inspectable and the recovery path obvious: read
//! the array back, or start empty when there is nothing usable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::{SwapError, SwapResult};

/// Terminal (or still-settling) state of a recorded swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Fail,
    Pending,
}

/// One swap as written to the history file
///
/// The amount is kept as the decimal string the user entered, not a
/// number, so the file reads back exactly what was swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub from: String,
    pub to: String,
    pub status: RecordStatus,
    pub amount: String,
    pub transaction_hash: String,
}

/// Append-only history backed by one JSON file
pub struct Ledger {
    path: PathBuf,
    records: RwLock<Vec<TransactionRecord>>,
}

impl Ledger {
    /// Read the history file, tolerating a missing or unreadable one
    ///
    /// A ledger that cannot be parsed starts empty rather than blocking
    /// startup; the warning is the only trace left of the old contents.
    pub async fn load(path: PathBuf) -> Self {
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<TransactionRecord>>(&bytes) {
                Ok(records) => records,
                Err(e) => {
                    warn!(
                        "Ledger at {} is not readable, starting empty: {}",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(
                    "Could not open ledger at {}, starting empty: {}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        };

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    /// Append one record and return the new full sequence
    ///
    /// The entire list is persisted before the in-memory copy picks up
    /// the new record; a failed write leaves memory unchanged. No lock
    /// is held across the write, so two overlapping appends may each
    /// persist their own snapshot and the last writer wins.
    pub async fn append(&self, record: TransactionRecord) -> SwapResult<Vec<TransactionRecord>> {
        let snapshot = {
            let records = self.records.read().await;
            let mut snapshot = records.clone();
            snapshot.push(record);
            snapshot
        };

        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| SwapError::Persistence(format!("failed to encode ledger: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SwapError::Persistence(format!(
                        "failed to create ledger directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        tokio::fs::write(&self.path, &bytes).await.map_err(|e| {
            SwapError::Persistence(format!(
                "failed to write ledger {}: {}",
                self.path.display(),
                e
            ))
        })?;

        *self.records.write().await = snapshot.clone();
        Ok(snapshot)
    }

    /// Current record list, oldest first
    pub async fn records(&self) -> Vec<TransactionRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}
