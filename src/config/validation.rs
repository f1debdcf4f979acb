//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: BotConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::{Address, Bytes};
use thiserror::Error;

use crate::config::schema::BotConfig;

/// Smallest scrypt cost accepted for a real vault.
pub const MIN_KDF_LOG_N: u8 = 10;
/// Largest scrypt cost accepted (N = 2^20, ~1 GiB with r = 8).
pub const MAX_KDF_LOG_N: u8 = 20;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check semantic constraints serde cannot express.
pub fn validate_config(config: &BotConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.blockchain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("blockchain.rpc_url", "not a valid URL"));
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
    }

    let submission = &config.submission;
    if submission.contract_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "submission.contract_address",
            format!("'{}' is not a 20-byte hex address", submission.contract_address),
        ));
    }
    if submission.call_data.parse::<Bytes>().is_err() {
        errors.push(ValidationError::new("submission.call_data", "not valid hex"));
    }
    if submission.gas_limit == 0 {
        errors.push(ValidationError::new("submission.gas_limit", "must be greater than 0"));
    }
    if submission.submit_timeout_ms == 0 {
        errors.push(ValidationError::new("submission.submit_timeout_ms", "must be greater than 0"));
    }
    if submission.retry_base_delay_ms > submission.retry_max_delay_ms {
        errors.push(ValidationError::new(
            "submission.retry_base_delay_ms",
            "must not exceed retry_max_delay_ms",
        ));
    }

    if !(MIN_KDF_LOG_N..=MAX_KDF_LOG_N).contains(&config.vault.kdf_log_n) {
        errors.push(ValidationError::new(
            "vault.kdf_log_n",
            format!("must be between {} and {}", MIN_KDF_LOG_N, MAX_KDF_LOG_N),
        ));
    }
    if config.vault.password_env.is_empty() {
        errors.push(ValidationError::new("vault.password_env", "must name an environment variable"));
    }

    if config.ledger.capacity == 0 {
        errors.push(ValidationError::new("ledger.capacity", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BotConfig {
        let mut config = BotConfig::default();
        config.submission.contract_address =
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string();
        config
    }

    #[test]
    fn test_defaults_with_contract_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_default_without_contract_is_invalid() {
        let errors = validate_config(&BotConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "submission.contract_address");
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = valid();
        config.submission.call_data = "0xzz".to_string();
        config.submission.submit_timeout_ms = 0;
        config.vault.kdf_log_n = 4;
        config.ledger.capacity = 0;

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "submission.call_data",
                "submission.submit_timeout_ms",
                "vault.kdf_log_n",
                "ledger.capacity",
            ]
        );
    }
}
