//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bot.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bot.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BotConfig {
    /// RPC endpoint settings.
    pub blockchain: BlockchainConfig,

    /// Contract call and submission behaviour.
    pub submission: SubmissionConfig,

    /// Encrypted credential vault.
    pub vault: VaultConfig,

    /// Submission audit ledger.
    pub ledger: LedgerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs (read calls only).
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Timeout for read calls in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
        }
    }
}

/// What to submit and how hard to try.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Target contract address (hex).
    pub contract_address: String,

    /// Call data sent to the contract (hex, `0x` optional).
    pub call_data: String,

    /// Gas limit per transaction.
    pub gas_limit: u64,

    /// Gas price in gwei.
    pub gas_price_gwei: u64,

    /// Deadline for a single broadcast in milliseconds.
    pub submit_timeout_ms: u64,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Base backoff between attempts in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Minimum spacing between batch submissions from different wallets.
    pub batch_delay_ms: u64,
}

impl SubmissionConfig {
    /// Gas price in wei.
    pub fn gas_price_wei(&self) -> u128 {
        u128::from(self.gas_price_gwei) * 1_000_000_000
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            call_data: "0x".to_string(),
            gas_limit: 300_000,
            gas_price_gwei: 5,
            submit_timeout_ms: 60_000,
            max_retries: 2,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 10_000,
            batch_delay_ms: 0,
        }
    }
}

/// Vault location and key derivation cost.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Path to the encrypted vault file.
    pub path: String,

    /// Environment variable holding the vault password.
    pub password_env: String,

    /// scrypt cost exponent (N = 2^kdf_log_n).
    pub kdf_log_n: u8,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: "wallets.vault.json".to_string(),
            password_env: "MINTBOT_VAULT_PASSWORD".to_string(),
            kdf_log_n: crate::vault::codec::DEFAULT_KDF_LOG_N,
        }
    }
}

/// Submission ledger persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Path to the ledger file.
    pub path: String,

    /// Maximum number of retained entries.
    pub capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: "mint_history.json".to_string(),
            capacity: crate::submission::ledger::DEFAULT_CAPACITY,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
