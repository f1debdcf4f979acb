//! Multi-wallet contract minting bot.
//!
//! Credentials live in a password-protected vault, are unlocked into a
//! [`KeyRing`], and drive sequential, retried contract calls through the
//! [`TransactionSubmitter`]. Every terminal outcome lands in a bounded
//! [`SubmissionLedger`].

pub mod blockchain;
pub mod config;
pub mod minting;
pub mod observability;
pub mod resilience;
pub mod submission;
pub mod vault;

pub use blockchain::{BlockchainClient, KeyRing, NonceAllocator, RemoteLedger};
pub use config::BotConfig;
pub use minting::{CallTemplate, Minter, Notifier};
pub use submission::{SubmissionLedger, SubmissionRequest, SubmissionResult, TransactionSubmitter};
pub use vault::{Credential, VaultCodec, VaultError};
