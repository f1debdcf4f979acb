//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! vault credentials
//!     → keyring.rs (address → signer, EIP-155 signing)
//!     → nonce.rs (per-address sequential nonces)
//!     → transaction.rs (legacy envelope, raw encoding)
//!     → client.rs (pending nonce, balances, raw broadcast)
//! ```
//!
//! # Security Constraints
//! - Private keys only ever arrive from the decrypted vault
//! - Never log private keys or sensitive data
//! - Read calls have configurable timeouts; broadcasts are bounded by the caller

pub mod client;
pub mod keyring;
pub mod nonce;
pub mod transaction;
pub mod types;

pub use client::{BlockchainClient, RemoteLedger};
pub use keyring::{KeyRing, KeyRingError};
pub use nonce::{NonceAllocator, NonceLease};
pub use transaction::{SignedTransaction, TransactionEnvelope};
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
