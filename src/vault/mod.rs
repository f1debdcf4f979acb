//! Encrypted credential vault.
//!
//! # Data Flow
//! ```text
//! vault file (hex JSON)
//!     → store.rs (read, hex decode)
//!     → codec.rs (scrypt → verify HMAC → AES-256-CBC decrypt)
//!     → Vec<Credential>
//!     → blockchain::KeyRing::load
//! ```
//!
//! # Security Constraints
//! - Plaintext credentials are never written to disk
//! - MAC is verified before any decryption is attempted
//! - Secrets and derived keys are zeroized when dropped

pub mod codec;
pub mod credential;
pub mod store;

use thiserror::Error;

pub use codec::{EncryptedVault, VaultCodec};
pub use credential::{Credential, SecretKey};
pub use store::VaultLoad;

/// Errors raised while sealing or opening the vault.
#[derive(Debug, Error)]
pub enum VaultError {
    /// MAC mismatch, wrong password, or any damaged vault field.
    #[error("vault integrity check failed (wrong password or tampered data)")]
    Integrity,

    /// Key derivation failed or could not run.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// Serialization or cipher setup failed while sealing.
    #[error("vault encoding failed: {0}")]
    Encoding(String),

    /// The vault file could not be read or written.
    #[error("vault persistence error: {0}")]
    Persistence(#[from] std::io::Error),
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;
