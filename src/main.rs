//! mint-bot command line front end.
//!
//! ```text
//! config (TOML) + vault password (env)
//!     → vault unlock → KeyRing
//!     → BlockchainClient (JSON-RPC)
//!     → TransactionSubmitter + SubmissionLedger
//!     → Minter (batch over every wallet)
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

use mint_bot::blockchain::{BlockchainClient, KeyRing};
use mint_bot::config::loader::{load_config, vault_password};
use mint_bot::config::BotConfig;
use mint_bot::minting::{CallTemplate, Minter, Notifier};
use mint_bot::observability::{logging, metrics};
use mint_bot::submission::{SubmissionLedger, TransactionSubmitter};
use mint_bot::vault::{store, SecretKey, VaultCodec};

#[derive(Parser)]
#[command(name = "mint-bot")]
#[command(about = "Submit contract mint calls from every wallet in an encrypted vault", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "mint-bot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the encrypted credential vault
    Vault {
        #[command(subcommand)]
        command: VaultCommands,
    },
    /// List wallet addresses loaded from the vault
    Wallets,
    /// Show the native balance of every wallet
    Balances,
    /// Submit the configured contract call from every wallet
    Mint,
    /// Show recent submission outcomes
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum VaultCommands {
    /// Add hex private keys (one per line) to the vault
    Import { keys_file: PathBuf },
}

/// Prints progress messages for the operator.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(config = %cli.config.display(), "mint-bot v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match cli.command {
        Commands::Vault {
            command: VaultCommands::Import { keys_file },
        } => import_keys(&config, &keys_file).await?,
        Commands::History { limit } => {
            let ledger = open_ledger(&config).await;
            let entries = ledger.recent(limit).await;
            if entries.is_empty() {
                println!("No submissions recorded");
            }
            for entry in entries {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
        Commands::Wallets => {
            let keyring = unlock_keyring(&config).await;
            println!("{} wallets loaded", keyring.len());
            for address in keyring.list_addresses() {
                println!("{}", address);
            }
        }
        Commands::Balances => {
            let minter = build_minter(&config).await?;
            for (address, balance) in minter.balances().await {
                match balance {
                    Ok(wei) => println!("{} {} wei", address, wei),
                    Err(e) => println!("{} unavailable: {}", address, e),
                }
            }
        }
        Commands::Mint => {
            let minter = build_minter(&config).await?;
            let outcomes = minter.mint_all().await;
            tracing::info!(wallets = outcomes.len(), "Mint run complete");
        }
    }

    Ok(())
}

async fn import_keys(config: &BotConfig, keys_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let password = vault_password(&config.vault)?;
    let codec = VaultCodec::new(config.vault.kdf_log_n)?;
    let contents = Zeroizing::new(tokio::fs::read_to_string(keys_file).await?);
    let secrets = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(SecretKey::new)
        .collect();

    let added = store::import(Path::new(&config.vault.path), password, codec, secrets).await?;
    println!("Imported {} new credentials into {}", added, config.vault.path);
    Ok(())
}

/// Unlock the vault, falling back to an empty key ring on any failure.
async fn unlock_keyring(config: &BotConfig) -> KeyRing {
    let password = match vault_password(&config.vault) {
        Ok(password) => password,
        Err(e) => {
            tracing::error!(error = %e, "Cannot unlock vault, continuing with no credentials");
            return KeyRing::default();
        }
    };
    let codec = match VaultCodec::new(config.vault.kdf_log_n) {
        Ok(codec) => codec,
        Err(e) => {
            tracing::error!(error = %e, "Invalid vault cost parameters, continuing with no credentials");
            return KeyRing::default();
        }
    };

    let loaded = store::unlock(Path::new(&config.vault.path), password, codec).await;
    KeyRing::load(loaded.into_credentials())
}

async fn open_ledger(config: &BotConfig) -> SubmissionLedger {
    let path = Path::new(&config.ledger.path);
    match SubmissionLedger::load_from_file(path, config.ledger.capacity).await {
        Ok(ledger) => ledger,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load submission ledger, starting empty");
            SubmissionLedger::new(config.ledger.capacity, Some(path.to_path_buf()))
        }
    }
}

async fn build_minter(
    config: &BotConfig,
) -> Result<Minter<BlockchainClient>, Box<dyn std::error::Error>> {
    let keyring = Arc::new(unlock_keyring(config).await);
    let ledger = Arc::new(open_ledger(config).await);
    let client = Arc::new(BlockchainClient::new(config.blockchain.clone()).await?);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    let submitter = TransactionSubmitter::new(&config.submission, client, keyring, ledger)
        .with_notifier(notifier.clone());
    let template = CallTemplate::from_config(config)?;

    Ok(Minter::new(
        Arc::new(submitter),
        template,
        notifier,
        Duration::from_millis(config.submission.batch_delay_ms),
    ))
}
