//! Bounded submission history and its persistence.
//!
//! The ledger keeps the newest `capacity` outcomes in insertion order and
//! mirrors them to a JSON file (oldest first) after every append. A failed
//! write is logged and never undoes the in-memory append.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::submission::types::{SubmissionResult, SubmissionStatus};

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Persisted copy of a [`SubmissionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub address: Address,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl From<&SubmissionResult> for LedgerEntry {
    fn from(result: &SubmissionResult) -> Self {
        Self {
            address: result.address,
            status: result.status,
            tx_hash: result.tx_hash,
            error: result.error.clone(),
            timestamp: result.timestamp,
        }
    }
}

/// Errors from reading or writing the ledger file.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type for ledger persistence.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Append-only, size-bounded record of submission outcomes.
#[derive(Debug)]
pub struct SubmissionLedger {
    entries: Mutex<VecDeque<LedgerEntry>>,
    capacity: usize,
    persistence_path: Option<PathBuf>,
}

impl SubmissionLedger {
    /// Create an empty ledger, optionally mirrored to `persistence_path`.
    pub fn new(capacity: usize, persistence_path: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            persistence_path,
        }
    }

    /// Load from file if it exists, keeping only the newest `capacity` entries.
    pub async fn load_from_file(path: &Path, capacity: usize) -> LedgerResult<Self> {
        let ledger = Self::new(capacity, Some(path.to_path_buf()));

        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let stored: Vec<LedgerEntry> = serde_json::from_slice(&bytes)?;
                let mut entries = ledger.entries.lock().await;
                let skip = stored.len().saturating_sub(ledger.capacity);
                entries.extend(stored.into_iter().skip(skip));
                metrics::record_ledger_size(entries.len());
                tracing::info!("Loaded {} ledger entries from {}", entries.len(), path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(ledger)
    }

    /// Record an outcome, evicting the oldest entries beyond capacity.
    pub async fn append(&self, result: &SubmissionResult) {
        let mut entries = self.entries.lock().await;
        entries.push_back(LedgerEntry::from(result));
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        metrics::record_ledger_size(entries.len());

        // Written under the lock so the file never regresses to an older snapshot.
        if let Err(e) = self.save(&entries).await {
            tracing::error!(error = %e, "Failed to persist submission ledger");
        }
    }

    /// The newest `limit` entries, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    async fn save(&self, entries: &VecDeque<LedgerEntry>) -> LedgerResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = temp_path(path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Sibling temporary file: `history.json` → `history.json.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
