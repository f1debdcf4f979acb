//! Submission request, result, and error types.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::blockchain::transaction::{max_gas_cost, TransactionEnvelope};
use crate::blockchain::types::BlockchainError;

/// One contract call to be sent from one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Credential that signs and pays for the call.
    pub address: Address,
    /// Target contract.
    pub contract: Address,
    /// Opaque call data.
    pub call_data: Bytes,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    pub chain_id: u64,
}

impl SubmissionRequest {
    /// Envelope for one attempt at `nonce`.
    pub fn envelope(&self, nonce: u64) -> TransactionEnvelope {
        TransactionEnvelope {
            to: self.contract,
            input: self.call_data.clone(),
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            chain_id: self.chain_id,
            nonce,
        }
    }

    /// Balance needed to cover the gas limit at the requested price.
    pub fn max_cost(&self) -> U256 {
        max_gas_cost(self.gas_limit, self.gas_price)
    }
}

/// Terminal status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Success,
    Failed,
}

/// Why the last attempt of a failed submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The broadcast deadline fired; the node may still have accepted the transaction.
    TimedOut,
    /// The node answered with an error.
    Rejected,
    /// The starting nonce could not be fetched.
    NonceUnavailable,
    /// The key ring could not sign.
    Signing,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::TimedOut => "timeout",
            FailureKind::Rejected => "rejected",
            FailureKind::NonceUnavailable => "nonce_unavailable",
            FailureKind::Signing => "signing",
        }
    }
}

/// Failure of a single attempt.
#[derive(Debug, Clone, Error)]
pub enum AttemptError {
    #[error("submission timed out after {}ms, outcome unknown", .0.as_millis())]
    Timeout(Duration),

    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("nonce unavailable: {0}")]
    NonceUnavailable(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

impl AttemptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AttemptError::Timeout(_) => FailureKind::TimedOut,
            AttemptError::Rejected(_) => FailureKind::Rejected,
            AttemptError::NonceUnavailable(_) => FailureKind::NonceUnavailable,
            AttemptError::Signing(_) => FailureKind::Signing,
        }
    }

    /// Everything except a signing failure goes back through the retry loop.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AttemptError::Signing(_))
    }
}

/// Every attempt in the retry budget failed.
#[derive(Debug, Clone, Error)]
#[error("retries exhausted after {attempts} attempts: {last}")]
pub struct RetriesExhausted {
    pub attempts: u32,
    pub last: AttemptError,
}

/// Errors that stop a submission before any nonce is consumed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no credential loaded for {0}")]
    UnknownCredential(Address),

    #[error("insufficient balance for {address}: have {balance} wei, need {required} wei")]
    InsufficientBalance {
        address: Address,
        balance: U256,
        required: U256,
    },

    #[error("balance check failed for {address}: {source}")]
    BalanceUnavailable {
        address: Address,
        #[source]
        source: BlockchainError,
    },
}

/// Terminal outcome of one submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub address: Address,
    pub status: SubmissionStatus,
    /// Hash reported by the node (success only).
    pub tx_hash: Option<TxHash>,
    /// Human-readable failure (failure only).
    pub error: Option<String>,
    /// Classification of the last failed attempt (failure only).
    pub failure: Option<FailureKind>,
    /// Nonce of the successful attempt.
    pub nonce: Option<u64>,
    /// Attempts made, including the first.
    pub attempts: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl SubmissionResult {
    pub fn success(address: Address, tx_hash: TxHash, nonce: u64, attempts: u32) -> Self {
        Self {
            address,
            status: SubmissionStatus::Success,
            tx_hash: Some(tx_hash),
            error: None,
            failure: None,
            nonce: Some(nonce),
            attempts,
            timestamp: now_millis(),
        }
    }

    pub fn failed(address: Address, failure: FailureKind, error: String, attempts: u32) -> Self {
        Self {
            address,
            status: SubmissionStatus::Failed,
            tx_hash: None,
            error: Some(error),
            failure: Some(failure),
            nonce: None,
            attempts,
            timestamp: now_millis(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }

    /// A timed-out final attempt does not prove the transaction was dropped.
    pub fn outcome_uncertain(&self) -> bool {
        self.failure == Some(FailureKind::TimedOut)
    }

    /// One-line operator message.
    pub fn message(&self) -> String {
        match (&self.tx_hash, &self.error) {
            (Some(hash), _) => format!("{} submitted, tx {}", self.address, hash),
            (None, Some(error)) if self.outcome_uncertain() => format!(
                "{} failed: {} (check the explorer before retrying)",
                self.address, error
            ),
            (None, Some(error)) => format!("{} failed: {}", self.address, error),
            (None, None) => format!("{} failed", self.address),
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
