//! Password-based vault encryption.
//!
//! # Construction
//! ```text
//! key        = scrypt(password, salt, N = 2^log_n, r = 8, p = 1, 32 bytes)
//! ciphertext = AES-256-CBC(key, iv, PKCS#7(json(credentials)))
//! mac        = HMAC-SHA256(key, iv || ciphertext)
//! ```
//!
//! Decryption verifies `mac` in constant time before touching the
//! ciphertext. A wrong password and a tampered blob are indistinguishable
//! and both surface as [`VaultError::Integrity`], as does any payload that
//! fails to decode after the MAC check.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use scrypt::{scrypt, Params};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::vault::credential::Credential;
use crate::vault::{VaultError, VaultResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Default scrypt cost (N = 2^14).
pub const DEFAULT_KDF_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// At-rest form of a credential collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedVault {
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub mac: Vec<u8>,
}

/// Encrypts and decrypts credential collections.
#[derive(Debug, Clone, Copy)]
pub struct VaultCodec {
    params: Params,
}

impl VaultCodec {
    /// Create a codec with scrypt cost `2^log_n`.
    pub fn new(log_n: u8) -> VaultResult<Self> {
        let params = Params::new(log_n, SCRYPT_R, SCRYPT_P, KEY_LEN)
            .map_err(|e| VaultError::Kdf(format!("invalid scrypt params: {}", e)))?;
        Ok(Self { params })
    }

    /// Encrypt `credentials` under `password` with a fresh salt and IV.
    pub fn encrypt(&self, credentials: &[Credential], password: &str) -> VaultResult<EncryptedVault> {
        let mut salt = vec![0u8; SALT_LEN];
        let mut iv = vec![0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let key = self.derive_key(password, &salt)?;
        let plaintext = Zeroizing::new(
            serde_json::to_vec(credentials).map_err(|e| VaultError::Encoding(e.to_string()))?,
        );

        let ciphertext = Aes256CbcEnc::new_from_slices(key.as_slice(), &iv)
            .map_err(|e| VaultError::Encoding(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

        let mac = authenticate(&key, &iv, &ciphertext)?.finalize().into_bytes().to_vec();

        Ok(EncryptedVault {
            salt,
            iv,
            ciphertext,
            mac,
        })
    }

    /// Verify and decrypt a vault.
    pub fn decrypt(&self, vault: &EncryptedVault, password: &str) -> VaultResult<Vec<Credential>> {
        if vault.salt.is_empty() || vault.iv.len() != IV_LEN || vault.mac.is_empty() {
            return Err(VaultError::Integrity);
        }

        let key = self.derive_key(password, &vault.salt)?;
        authenticate(&key, &vault.iv, &vault.ciphertext)?
            .verify_slice(&vault.mac)
            .map_err(|_| VaultError::Integrity)?;

        let plaintext = Zeroizing::new(
            Aes256CbcDec::new_from_slices(key.as_slice(), &vault.iv)
                .map_err(|_| VaultError::Integrity)?
                .decrypt_padded_vec_mut::<Pkcs7>(&vault.ciphertext)
                .map_err(|_| VaultError::Integrity)?,
        );

        serde_json::from_slice(&plaintext).map_err(|_| VaultError::Integrity)
    }

    fn derive_key(&self, password: &str, salt: &[u8]) -> VaultResult<Zeroizing<[u8; KEY_LEN]>> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        scrypt(password.as_bytes(), salt, &self.params, key.as_mut_slice())
            .map_err(|e| VaultError::Kdf(e.to_string()))?;
        Ok(key)
    }
}

impl Default for VaultCodec {
    fn default() -> Self {
        Self {
            params: Params::new(DEFAULT_KDF_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
                .unwrap_or_else(|_| Params::recommended()),
        }
    }
}

fn authenticate(key: &[u8; KEY_LEN], iv: &[u8], ciphertext: &[u8]) -> VaultResult<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| VaultError::Encoding(e.to_string()))?;
    mac.update(iv);
    mac.update(ciphertext);
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 2] = [
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    ];

    fn codec() -> VaultCodec {
        // Cheap parameters keep the bit-flip sweeps fast.
        VaultCodec::new(4).unwrap()
    }

    fn credentials() -> Vec<Credential> {
        KEYS.iter().map(|k| Credential::from_secret(k).unwrap()).collect()
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        let creds = credentials();
        let vault = codec.encrypt(&creds, "correct horse").unwrap();

        assert_eq!(vault.salt.len(), SALT_LEN);
        assert_eq!(vault.iv.len(), IV_LEN);
        assert_eq!(vault.mac.len(), 32);
        assert_eq!(codec.decrypt(&vault, "correct horse").unwrap(), creds);
    }

    #[test]
    fn test_empty_collection_round_trip() {
        let codec = codec();
        let vault = codec.encrypt(&[], "pw").unwrap();
        assert!(codec.decrypt(&vault, "pw").unwrap().is_empty());
    }

    #[test]
    fn test_fresh_salt_and_iv_per_encryption() {
        let codec = codec();
        let a = codec.encrypt(&credentials(), "pw").unwrap();
        let b = codec.encrypt(&credentials(), "pw").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_plaintext_not_visible_in_ciphertext() {
        let vault = codec().encrypt(&credentials(), "pw").unwrap();
        let haystack = hex::encode(&vault.ciphertext);
        assert!(!haystack.contains(&KEYS[0][..16]));
    }

    #[test]
    fn test_wrong_password() {
        let codec = codec();
        let vault = codec.encrypt(&credentials(), "right").unwrap();
        assert!(matches!(
            codec.decrypt(&vault, "wrong"),
            Err(VaultError::Integrity)
        ));
    }

    #[test]
    fn test_ciphertext_bit_flips_detected() {
        let codec = codec();
        let vault = codec.encrypt(&credentials(), "pw").unwrap();

        for byte in 0..vault.ciphertext.len() {
            let mut tampered = vault.clone();
            tampered.ciphertext[byte] ^= 1 << (byte % 8);
            assert!(
                matches!(codec.decrypt(&tampered, "pw"), Err(VaultError::Integrity)),
                "flip in ciphertext byte {} went undetected",
                byte
            );
        }
    }

    #[test]
    fn test_mac_bit_flips_detected() {
        let codec = codec();
        let vault = codec.encrypt(&credentials(), "pw").unwrap();

        for byte in 0..vault.mac.len() {
            for bit in 0..8 {
                let mut tampered = vault.clone();
                tampered.mac[byte] ^= 1 << bit;
                assert!(matches!(
                    codec.decrypt(&tampered, "pw"),
                    Err(VaultError::Integrity)
                ));
            }
        }
    }

    #[test]
    fn test_iv_bit_flips_detected() {
        let codec = codec();
        let vault = codec.encrypt(&credentials(), "pw").unwrap();

        for byte in 0..vault.iv.len() {
            for bit in [0, 5] {
                let mut tampered = vault.clone();
                tampered.iv[byte] ^= 1 << bit;
                assert!(
                    matches!(codec.decrypt(&tampered, "pw"), Err(VaultError::Integrity)),
                    "flip of bit {} in iv byte {} went undetected",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_salt_bit_flips_detected() {
        let codec = codec();
        let vault = codec.encrypt(&credentials(), "pw").unwrap();

        for byte in [0, vault.salt.len() / 2, vault.salt.len() - 1] {
            let mut tampered = vault.clone();
            tampered.salt[byte] ^= 1;
            assert!(matches!(
                codec.decrypt(&tampered, "pw"),
                Err(VaultError::Integrity)
            ));
        }
    }

    #[test]
    fn test_truncated_fields_detected() {
        let codec = codec();
        let vault = codec.encrypt(&credentials(), "pw").unwrap();

        let mut short_iv = vault.clone();
        short_iv.iv.truncate(8);
        assert!(matches!(codec.decrypt(&short_iv, "pw"), Err(VaultError::Integrity)));

        let mut short_ct = vault.clone();
        short_ct.ciphertext.truncate(16);
        assert!(matches!(codec.decrypt(&short_ct, "pw"), Err(VaultError::Integrity)));

        let mut no_mac = vault;
        no_mac.mac.clear();
        assert!(matches!(codec.decrypt(&no_mac, "pw"), Err(VaultError::Integrity)));
    }

    #[test]
    fn test_cost_mismatch_fails_integrity() {
        let vault = codec().encrypt(&credentials(), "pw").unwrap();
        let other = VaultCodec::new(5).unwrap();
        assert!(matches!(other.decrypt(&vault, "pw"), Err(VaultError::Integrity)));
    }
}
