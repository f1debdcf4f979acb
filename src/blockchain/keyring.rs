//! In-memory key ring and transaction signing.
//!
//! # Security
//! - Keys enter only through [`KeyRing::load`] from decrypted vault credentials
//! - Keys are never logged, serialized, or returned to callers
//! - Signing keys zeroize their scalar when the ring is dropped

use alloy::consensus::SignableTransaction;
use alloy::network::TxSignerSync;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::blockchain::transaction::{SignedTransaction, TransactionEnvelope};
use crate::observability::metrics;
use crate::vault::Credential;

/// Errors raised by the key ring.
#[derive(Debug, Error)]
pub enum KeyRingError {
    /// A credential's key is not a valid secp256k1 scalar or does not match its address.
    #[error("malformed credential: {reason}")]
    MalformedCredential {
        address: Option<Address>,
        reason: String,
    },

    /// No credential is loaded for the requested address.
    #[error("no credential loaded for {0}")]
    UnknownCredential(Address),

    /// The signer refused the transaction.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Result type for key ring operations.
pub type KeyRingResult<T> = Result<T, KeyRingError>;

/// Signing keys indexed by address, read-only after load.
#[derive(Default)]
pub struct KeyRing {
    signers: HashMap<Address, PrivateKeySigner>,
}

impl KeyRing {
    /// Build a key ring from decrypted credentials.
    ///
    /// Malformed credentials are skipped with a warning; the rest still load.
    pub fn load(credentials: Vec<Credential>) -> Self {
        let mut signers = HashMap::with_capacity(credentials.len());

        for credential in credentials {
            match credential.to_signer() {
                Ok(signer) => {
                    signers.insert(credential.address, signer);
                }
                Err(e) => {
                    tracing::warn!(address = %credential.address, error = %e, "Skipping malformed credential");
                }
            }
        }

        tracing::info!(count = signers.len(), "Key ring loaded");
        metrics::record_keyring_size(signers.len());

        Self { signers }
    }

    /// Sign `envelope` with the key for `address`.
    pub fn sign(
        &self,
        address: Address,
        envelope: &TransactionEnvelope,
    ) -> KeyRingResult<SignedTransaction> {
        let signer = self
            .signers
            .get(&address)
            .ok_or(KeyRingError::UnknownCredential(address))?;

        let mut tx = envelope.to_legacy();
        let signature = signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| KeyRingError::Signing(e.to_string()))?;

        Ok(tx.into_signed(signature).into())
    }

    /// Whether a key is loaded for `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.signers.contains_key(address)
    }

    /// All loaded addresses, in ascending order.
    pub fn list_addresses(&self) -> BTreeSet<Address> {
        self.signers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("addresses", &self.list_addresses())
            .finish()
    }
}
