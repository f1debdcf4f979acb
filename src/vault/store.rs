//! Vault file persistence.
//!
//! The on-disk format is a JSON object with four hex strings:
//! `salt`, `iv`, `encryptedData` and `hmac`. Any field that is missing or
//! fails to decode is reported as an integrity failure on load.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use crate::vault::codec::{EncryptedVault, VaultCodec};
use crate::vault::credential::{Credential, SecretKey};
use crate::vault::{VaultError, VaultResult};

/// Hex-encoded file representation of an [`EncryptedVault`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultFile {
    salt: String,
    iv: String,
    encrypted_data: String,
    hmac: String,
}

impl From<&EncryptedVault> for VaultFile {
    fn from(vault: &EncryptedVault) -> Self {
        Self {
            salt: hex::encode(&vault.salt),
            iv: hex::encode(&vault.iv),
            encrypted_data: hex::encode(&vault.ciphertext),
            hmac: hex::encode(&vault.mac),
        }
    }
}

impl TryFrom<VaultFile> for EncryptedVault {
    type Error = VaultError;

    fn try_from(file: VaultFile) -> VaultResult<Self> {
        let decode = |field: &str| hex::decode(field).map_err(|_| VaultError::Integrity);
        Ok(Self {
            salt: decode(&file.salt)?,
            iv: decode(&file.iv)?,
            ciphertext: decode(&file.encrypted_data)?,
            mac: decode(&file.hmac)?,
        })
    }
}

/// Outcome of opening the vault at startup.
#[derive(Debug)]
pub enum VaultLoad {
    /// The vault decrypted and verified.
    Loaded(Vec<Credential>),
    /// No vault file exists yet.
    Missing,
    /// The vault exists but could not be opened.
    Failed(VaultError),
}

impl VaultLoad {
    /// Credentials to hand to the key ring; empty unless the vault loaded.
    pub fn into_credentials(self) -> Vec<Credential> {
        match self {
            VaultLoad::Loaded(credentials) => credentials,
            VaultLoad::Missing | VaultLoad::Failed(_) => Vec::new(),
        }
    }
}

/// Read and parse a vault file.
///
/// Returns `Ok(None)` when the file does not exist. Blocking.
pub fn read_vault(path: &Path) -> VaultResult<Option<EncryptedVault>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(VaultError::Persistence(e)),
    };
    let file: VaultFile = serde_json::from_str(&content).map_err(|_| VaultError::Integrity)?;
    EncryptedVault::try_from(file).map(Some)
}

/// Write a vault file, replacing any previous one atomically. Blocking.
pub fn write_vault(path: &Path, vault: &EncryptedVault) -> VaultResult<()> {
    let json = serde_json::to_string_pretty(&VaultFile::from(vault))
        .map_err(|e| VaultError::Encoding(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Open the vault at `path`.
///
/// Never fails the process: an unreadable or unverifiable vault is logged
/// loudly and reported as [`VaultLoad::Failed`]. The file read and key
/// derivation run on the blocking pool.
pub async fn unlock(path: &Path, password: Zeroizing<String>, codec: VaultCodec) -> VaultLoad {
    let file = path.to_path_buf();
    let opened = tokio::task::spawn_blocking(move || match read_vault(&file)? {
        Some(vault) => codec.decrypt(&vault, password.as_str()).map(Some),
        None => Ok(None),
    })
    .await;

    match opened {
        Ok(Ok(Some(credentials))) => {
            tracing::info!(path = %path.display(), count = credentials.len(), "Vault unlocked");
            VaultLoad::Loaded(credentials)
        }
        Ok(Ok(None)) => {
            tracing::warn!(path = %path.display(), "No vault file found, starting with no credentials");
            VaultLoad::Missing
        }
        Ok(Err(e)) => {
            tracing::error!(path = %path.display(), error = %e, "VAULT LOAD FAILED, no credentials available");
            VaultLoad::Failed(e)
        }
        Err(e) => {
            tracing::error!(error = %e, "Vault decryption task failed");
            VaultLoad::Failed(VaultError::Kdf(e.to_string()))
        }
    }
}

/// Merge `secrets` into the vault at `path` and re-encrypt it.
///
/// An existing vault must open with `password`; keys whose address is
/// already present are skipped. Returns the number of credentials added.
pub async fn import(
    path: &Path,
    password: Zeroizing<String>,
    codec: VaultCodec,
    secrets: Vec<SecretKey>,
) -> VaultResult<usize> {
    let mut credentials = match unlock(path, password.clone(), codec).await {
        VaultLoad::Loaded(credentials) => credentials,
        VaultLoad::Missing => Vec::new(),
        VaultLoad::Failed(e) => return Err(e),
    };

    let mut added = 0;
    for secret in secrets {
        match Credential::from_key(secret) {
            Ok(credential) if credentials.iter().any(|c| c.address == credential.address) => {
                tracing::info!(address = %credential.address, "Credential already in vault, skipping");
            }
            Ok(credential) => {
                tracing::info!(address = %credential.address, "Adding credential to vault");
                credentials.push(credential);
                added += 1;
            }
            Err(e) => tracing::warn!(error = %e, "Skipping malformed key"),
        }
    }

    let file = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let vault = codec.encrypt(&credentials, password.as_str())?;
        write_vault(&file, &vault)
    })
    .await
    .map_err(|e| VaultError::Kdf(e.to_string()))??;
    Ok(added)
}

/// Sibling temporary file: `wallets.json` → `wallets.json.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
