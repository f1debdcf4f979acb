//! Credential records held inside the vault.
//!
//! # Security
//! - The secret lives in a [`SecretKey`] that wipes its buffer on drop
//! - `Debug` output never contains key material
//! - Plaintext credentials only exist between vault decryption and key ring load

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::blockchain::keyring::{KeyRingError, KeyRingResult};

/// Length of a secp256k1 private scalar in bytes.
pub const SECRET_LEN: usize = 32;

/// Hex-encoded private key, wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(hex_key: impl Into<String>) -> Self {
        Self(hex_key.into())
    }

    /// Decode the key into raw scalar bytes.
    ///
    /// Accepts surrounding whitespace and an optional `0x` prefix; anything
    /// other than exactly 64 hex digits is rejected.
    pub fn to_bytes(&self) -> Result<Zeroizing<[u8; SECRET_LEN]>, String> {
        let trimmed = self.0.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != SECRET_LEN * 2 {
            return Err(format!(
                "expected {} hex digits, found {}",
                SECRET_LEN * 2,
                digits.len()
            ));
        }

        let mut bytes = Zeroizing::new([0u8; SECRET_LEN]);
        hex::decode_to_slice(digits, bytes.as_mut_slice()).map_err(|e| e.to_string())?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// An address together with the key that controls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Address derived from the secret.
    pub address: Address,
    /// Private key material.
    #[serde(rename = "privateKey")]
    secret: SecretKey,
}

impl Credential {
    /// Build a credential from an address/secret pair without validating it.
    ///
    /// Validation happens when the key ring loads the credential.
    pub fn new(address: Address, secret: SecretKey) -> Self {
        Self { address, secret }
    }

    /// Build a credential from a hex private key, deriving its address.
    pub fn from_secret(hex_key: &str) -> KeyRingResult<Self> {
        Self::from_key(SecretKey::new(hex_key))
    }

    /// Take ownership of `secret` and derive its address.
    pub fn from_key(secret: SecretKey) -> KeyRingResult<Self> {
        let signer = signer_for(&secret, None)?;
        Ok(Self {
            address: signer.address(),
            secret,
        })
    }

    /// Derive the signer for this credential, checking the stored address.
    pub(crate) fn to_signer(&self) -> KeyRingResult<PrivateKeySigner> {
        let signer = signer_for(&self.secret, Some(self.address))?;
        if signer.address() != self.address {
            return Err(KeyRingError::MalformedCredential {
                address: Some(self.address),
                reason: format!("key derives {}, not the stored address", signer.address()),
            });
        }
        Ok(signer)
    }
}

fn signer_for(secret: &SecretKey, address: Option<Address>) -> KeyRingResult<PrivateKeySigner> {
    let bytes = secret
        .to_bytes()
        .map_err(|reason| KeyRingError::MalformedCredential { address, reason })?;

    PrivateKeySigner::from_slice(bytes.as_slice()).map_err(|e| KeyRingError::MalformedCredential {
        address,
        reason: format!("invalid secp256k1 scalar: {}", e),
    })
}
