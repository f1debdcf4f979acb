//! Vault import, unlock and key ring loading end to end.

use std::fs;
use zeroize::Zeroizing;

use mint_bot::blockchain::{KeyRing, TransactionEnvelope};
use mint_bot::vault::{store, SecretKey, VaultCodec, VaultError, VaultLoad};

mod common;
use common::{address_of, CHAIN_ID, KEY_A, KEY_B};

fn codec() -> VaultCodec {
    VaultCodec::new(4).unwrap()
}

fn password(s: &str) -> Zeroizing<String> {
    Zeroizing::new(s.to_string())
}

fn keys(hex: &[&str]) -> Vec<SecretKey> {
    hex.iter().map(|k| SecretKey::new(*k)).collect()
}

#[tokio::test]
async fn test_imported_keys_sign_after_unlock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallets.vault.json");

    let added = store::import(
        &path,
        password("hunter2"),
        codec(),
        vec![
            SecretKey::new(format!("0x{}", KEY_A)),
            SecretKey::new(KEY_B),
            SecretKey::new("garbage"),
        ],
    )
    .await
    .unwrap();
    assert_eq!(added, 2);

    let on_disk = fs::read_to_string(&path).unwrap();
    assert!(!on_disk.contains(KEY_A));

    let ring = KeyRing::load(store::unlock(&path, password("hunter2"), codec()).await.into_credentials());
    assert_eq!(ring.len(), 2);

    let envelope = TransactionEnvelope {
        to: address_of(KEY_B),
        input: Default::default(),
        gas_limit: 21_000,
        gas_price: 1,
        chain_id: CHAIN_ID,
        nonce: 0,
    };
    assert!(ring.sign(address_of(KEY_A), &envelope).is_ok());
}

#[tokio::test]
async fn test_wrong_password_yields_empty_key_ring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallets.vault.json");
    store::import(&path, password("right"), codec(), keys(&[KEY_A]))
        .await
        .unwrap();

    let loaded = store::unlock(&path, password("wrong"), codec()).await;
    assert!(matches!(loaded, VaultLoad::Failed(VaultError::Integrity)));
    assert!(KeyRing::load(loaded.into_credentials()).is_empty());
}

#[tokio::test]
async fn test_tampered_file_fails_integrity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallets.vault.json");
    store::import(&path, password("pw"), codec(), keys(&[KEY_A]))
        .await
        .unwrap();

    let mut file: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let data = file["encryptedData"].as_str().unwrap().to_string();
    let flipped = if data.starts_with('0') { "1" } else { "0" };
    file["encryptedData"] = serde_json::Value::String(format!("{}{}", flipped, &data[1..]));
    fs::write(&path, file.to_string()).unwrap();

    let loaded = store::unlock(&path, password("pw"), codec()).await;
    assert!(matches!(loaded, VaultLoad::Failed(VaultError::Integrity)));
}

#[tokio::test]
async fn test_missing_vault_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = store::unlock(&dir.path().join("absent.json"), password("pw"), codec()).await;
    assert!(matches!(loaded, VaultLoad::Missing));
}

#[tokio::test]
async fn test_import_beside_same_stem_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let sibling = dir.path().join("state.tmp");
    fs::write(&sibling, "unrelated").unwrap();

    store::import(&path, password("pw"), codec(), keys(&[KEY_A]))
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(&sibling).unwrap(), "unrelated");
    let loaded = store::unlock(&path, password("pw"), codec()).await;
    assert_eq!(loaded.into_credentials().len(), 1);
}
