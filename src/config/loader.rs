//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::schema::{BotConfig, VaultConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Vault password variable {0} is not set")]
    MissingPassword(String),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BotConfig, ConfigError> {
    let config: BotConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read the vault password from the environment variable named in `vault`.
pub fn vault_password(vault: &VaultConfig) -> Result<Zeroizing<String>, ConfigError> {
    std::env::var(&vault.password_env)
        .map(Zeroizing::new)
        .map_err(|_| ConfigError::MissingPassword(vault.password_env.clone()))
}
