//! Shared helpers for submission integration tests.
#![allow(dead_code)]

use alloy::consensus::{SignableTransaction, Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mint_bot::blockchain::types::{BlockchainError, BlockchainResult};
use mint_bot::blockchain::{KeyRing, RemoteLedger};
use mint_bot::config::SubmissionConfig;
use mint_bot::minting::Notifier;
use mint_bot::submission::{SubmissionLedger, SubmissionRequest, TransactionSubmitter};
use mint_bot::vault::Credential;

// Anvil's default accounts.
pub const KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const KEY_C: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

pub const CHAIN_ID: u64 = 31337;

/// How the mock node answers one broadcast.
#[derive(Debug, Clone, Copy)]
pub enum Broadcast {
    Accept,
    Reject(&'static str),
    /// Never answer; the caller's deadline must fire.
    Hang,
}

/// A transaction the mock node accepted or saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub from: Address,
    pub nonce: u64,
    pub hash: TxHash,
}

/// Scriptable in-memory node.
///
/// Broadcast answers are taken from the script in order, then default to
/// `Accept`. Every broadcast, answered or not, is recorded in arrival order.
pub struct MockLedger {
    pending: Mutex<HashMap<Address, u64>>,
    balances: Mutex<HashMap<Address, U256>>,
    default_balance: U256,
    script: Mutex<VecDeque<Broadcast>>,
    sent: Mutex<Vec<Sent>>,
    broadcast_delay: Duration,
    pub pending_queries: AtomicU32,
    pub balance_queries: AtomicU32,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            default_balance: U256::from(10u64).pow(U256::from(18u64)),
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            broadcast_delay: Duration::ZERO,
            pending_queries: AtomicU32::new(0),
            balance_queries: AtomicU32::new(0),
        }
    }

    pub fn with_pending_nonce(self, address: Address, nonce: u64) -> Self {
        self.pending.lock().unwrap().insert(address, nonce);
        self
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.balances.lock().unwrap().insert(address, balance);
        self
    }

    pub fn with_script(self, script: impl IntoIterator<Item = Broadcast>) -> Self {
        self.script.lock().unwrap().extend(script);
        self
    }

    /// Delay every broadcast answer, widening race windows.
    pub fn with_broadcast_delay(mut self, delay: Duration) -> Self {
        self.broadcast_delay = delay;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn nonces_sent_by(&self, address: Address) -> Vec<u64> {
        self.sent()
            .into_iter()
            .filter(|s| s.from == address)
            .map(|s| s.nonce)
            .collect()
    }
}

impl RemoteLedger for MockLedger {
    async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.pending_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending.lock().unwrap().get(&address).copied().unwrap_or(0))
    }

    async fn submit_signed_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| BlockchainError::Rejected(format!("undecodable transaction: {}", e)))?;
        let legacy = envelope
            .as_legacy()
            .ok_or_else(|| BlockchainError::Rejected("expected legacy transaction".into()))?;
        let from = legacy
            .signature()
            .recover_address_from_prehash(&legacy.tx().signature_hash())
            .map_err(|e| BlockchainError::Rejected(e.to_string()))?;
        let hash = *envelope.tx_hash();

        self.sent.lock().unwrap().push(Sent {
            from,
            nonce: envelope.nonce(),
            hash,
        });
        let answer = self.script.lock().unwrap().pop_front().unwrap_or(Broadcast::Accept);

        if !self.broadcast_delay.is_zero() {
            tokio::time::sleep(self.broadcast_delay).await;
        }
        match answer {
            Broadcast::Accept => Ok(hash),
            Broadcast::Reject(reason) => Err(BlockchainError::Rejected(reason.to_string())),
            Broadcast::Hang => std::future::pending().await,
        }
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or(self.default_balance))
    }
}

/// Notifier that keeps every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub fn address_of(key: &str) -> Address {
    Credential::from_secret(key).unwrap().address
}

pub fn keyring(keys: &[&str]) -> Arc<KeyRing> {
    Arc::new(KeyRing::load(
        keys.iter().map(|k| Credential::from_secret(k).unwrap()).collect(),
    ))
}

/// Short deadlines and near-zero backoff so retry paths run quickly.
pub fn fast_config() -> SubmissionConfig {
    SubmissionConfig {
        contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
        call_data: "0x1249c58b".to_string(),
        gas_limit: 100_000,
        gas_price_gwei: 1,
        submit_timeout_ms: 50,
        max_retries: 2,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 5,
        batch_delay_ms: 0,
    }
}

pub fn request(config: &SubmissionConfig, address: Address) -> SubmissionRequest {
    SubmissionRequest {
        address,
        contract: config.contract_address.parse().unwrap(),
        call_data: config.call_data.parse().unwrap(),
        gas_limit: config.gas_limit,
        gas_price: config.gas_price_wei(),
        chain_id: CHAIN_ID,
    }
}

pub struct Harness {
    pub remote: Arc<MockLedger>,
    pub ledger: Arc<SubmissionLedger>,
    pub notifier: Arc<RecordingNotifier>,
    pub submitter: Arc<TransactionSubmitter<MockLedger>>,
}

pub fn harness(config: &SubmissionConfig, remote: MockLedger, keys: &[&str]) -> Harness {
    let remote = Arc::new(remote);
    let ledger = Arc::new(SubmissionLedger::new(100, None));
    let notifier = Arc::new(RecordingNotifier::default());
    let submitter = TransactionSubmitter::new(config, remote.clone(), keyring(keys), ledger.clone())
        .with_notifier(notifier.clone());

    Harness {
        remote,
        ledger,
        notifier,
        submitter: Arc::new(submitter),
    }
}
