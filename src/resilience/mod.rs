//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Submission attempt:
//!     → timeouts.rs (race the broadcast against a deadline)
//!     → On failure: retries.rs (check remaining budget)
//!     → backoff.rs (jittered delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every broadcast has a deadline
//! - Retry budgets are counted in attempts, not wall-clock time
//! - A timed-out broadcast is reported separately from a rejected one

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{race, Deadline};
