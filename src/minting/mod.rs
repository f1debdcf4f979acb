//! Multi-wallet minting on top of the submission engine.
//!
//! # Data Flow
//! ```text
//! BotConfig.submission → CallTemplate
//! KeyRing addresses    → one SubmissionRequest per wallet
//!     → batch.rs (concurrent across wallets, staggered by batch_delay_ms)
//!     → TransactionSubmitter
//!     → notify.rs (one terminal message per wallet)
//! ```

pub mod batch;
pub mod notify;

pub use batch::{CallTemplate, MintOutcome, Minter};
pub use notify::{LogNotifier, Notifier};
