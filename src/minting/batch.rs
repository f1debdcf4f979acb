//! Batch minting across every loaded wallet.

use alloy::primitives::{Address, Bytes, U256};
use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::client::RemoteLedger;
use crate::blockchain::types::BlockchainResult;
use crate::config::schema::BotConfig;
use crate::config::validation::ValidationError;
use crate::minting::notify::Notifier;
use crate::submission::{
    LedgerEntry, SubmissionRequest, SubmissionResult, SubmitError, TransactionSubmitter,
};

/// The contract call every wallet submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTemplate {
    pub contract: Address,
    pub call_data: Bytes,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    pub chain_id: u64,
}

impl CallTemplate {
    pub fn from_config(config: &BotConfig) -> Result<Self, ValidationError> {
        let submission = &config.submission;
        let contract = submission.contract_address.parse().map_err(|_| {
            ValidationError::new("submission.contract_address", "not a 20-byte hex address")
        })?;
        let call_data = submission
            .call_data
            .parse()
            .map_err(|_| ValidationError::new("submission.call_data", "not valid hex"))?;

        Ok(Self {
            contract,
            call_data,
            gas_limit: submission.gas_limit,
            gas_price: submission.gas_price_wei(),
            chain_id: config.blockchain.chain_id,
        })
    }

    pub fn request_for(&self, address: Address) -> SubmissionRequest {
        SubmissionRequest {
            address,
            contract: self.contract,
            call_data: self.call_data.clone(),
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            chain_id: self.chain_id,
        }
    }
}

/// Outcome for one wallet in a batch.
#[derive(Debug)]
pub struct MintOutcome {
    pub address: Address,
    pub result: Result<SubmissionResult, SubmitError>,
}

impl MintOutcome {
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(result) if result.is_success())
    }

    /// The single terminal message for this wallet.
    pub fn message(&self) -> String {
        match &self.result {
            Ok(result) => result.message(),
            Err(e) => format!("{} skipped: {}", self.address, e),
        }
    }
}

/// Drives submissions for all wallets in the key ring.
pub struct Minter<L> {
    submitter: Arc<TransactionSubmitter<L>>,
    template: CallTemplate,
    notifier: Arc<dyn Notifier>,
    batch_delay: Duration,
}

impl<L: RemoteLedger> Minter<L> {
    pub fn new(
        submitter: Arc<TransactionSubmitter<L>>,
        template: CallTemplate,
        notifier: Arc<dyn Notifier>,
        batch_delay: Duration,
    ) -> Self {
        Self {
            submitter,
            template,
            notifier,
            batch_delay,
        }
    }

    pub fn wallets(&self) -> BTreeSet<Address> {
        self.submitter.keyring().list_addresses()
    }

    /// Mint from one wallet and report the outcome.
    pub async fn mint(&self, address: Address) -> MintOutcome {
        let request = self.template.request_for(address);
        let outcome = MintOutcome {
            address,
            result: self.submitter.submit(&request).await,
        };
        self.notifier.notify(&outcome.message());
        outcome
    }

    /// Mint from every wallet.
    ///
    /// Wallets run concurrently; the i-th wallet starts `i × batch_delay`
    /// after the first. A failing wallet never stops the others.
    pub async fn mint_all(&self) -> Vec<MintOutcome> {
        let wallets = self.wallets();
        if wallets.is_empty() {
            self.notifier.notify("No wallets loaded, nothing to mint");
            return Vec::new();
        }

        self.notifier
            .notify(&format!("Minting from {} wallets", wallets.len()));
        tracing::info!(
            wallets = wallets.len(),
            delay_ms = self.batch_delay.as_millis() as u64,
            "Starting batch mint"
        );

        let runs = wallets.into_iter().enumerate().map(|(i, address)| {
            let offset = self.batch_delay.saturating_mul(i as u32);
            async move {
                if !offset.is_zero() {
                    tokio::time::sleep(offset).await;
                }
                self.mint(address).await
            }
        });
        let outcomes = join_all(runs).await;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        self.notifier.notify(&format!(
            "Batch finished: {} succeeded, {} failed",
            succeeded,
            outcomes.len() - succeeded
        ));
        outcomes
    }

    /// Raw balance of every wallet, in wei.
    pub async fn balances(&self) -> Vec<(Address, BlockchainResult<U256>)> {
        let remote = self.submitter.remote();
        let lookups = self.wallets().into_iter().map(|address| async move {
            (address, remote.get_balance(address).await)
        });
        join_all(lookups).await
    }

    /// Most recent ledger entries, newest first.
    pub async fn history(&self, limit: usize) -> Vec<LedgerEntry> {
        self.submitter.ledger().recent(limit).await
    }
}
