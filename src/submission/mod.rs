//! Transaction submission engine.
//!
//! # Data Flow
//! ```text
//! SubmissionRequest
//!     → submitter.rs (balance pre-flight, nonce lease, sign, broadcast, retry)
//!     → SubmissionResult
//!     → ledger.rs (bounded history, JSON file)
//! ```

pub mod ledger;
pub mod submitter;
pub mod types;

pub use ledger::{LedgerEntry, SubmissionLedger};
pub use submitter::TransactionSubmitter;
pub use types::{
    AttemptError, FailureKind, RetriesExhausted, SubmissionRequest, SubmissionResult,
    SubmissionStatus, SubmitError,
};
