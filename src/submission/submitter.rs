//! Transaction submission with per-address ordering, timeouts and retries.
//!
//! # State Machine
//! ```text
//! Building → Signed → Submitted → Succeeded
//!                              → TimedOut         → retry → Building
//!                              → RejectedByRemote → retry → Building
//! retry budget spent → Failed
//! ```
//!
//! The nonce lease for the request's address is held from the first nonce
//! allocation until the terminal outcome, so a later request for the same
//! address cannot be broadcast while an earlier one is still in flight.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::blockchain::client::RemoteLedger;
use crate::blockchain::keyring::KeyRing;
use crate::blockchain::nonce::{NonceAllocator, NonceLease};
use crate::config::schema::SubmissionConfig;
use crate::minting::notify::{LogNotifier, Notifier};
use crate::observability::metrics;
use crate::resilience::{race, Deadline, RetryPolicy};
use crate::submission::ledger::SubmissionLedger;
use crate::submission::types::{
    AttemptError, RetriesExhausted, SubmissionRequest, SubmissionResult, SubmitError,
};

/// Signs and broadcasts submission requests.
pub struct TransactionSubmitter<L> {
    remote: Arc<L>,
    keyring: Arc<KeyRing>,
    nonces: Arc<NonceAllocator>,
    ledger: Arc<SubmissionLedger>,
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
    submit_timeout: Duration,
}

impl<L: RemoteLedger> TransactionSubmitter<L> {
    pub fn new(
        config: &SubmissionConfig,
        remote: Arc<L>,
        keyring: Arc<KeyRing>,
        ledger: Arc<SubmissionLedger>,
    ) -> Self {
        Self {
            remote,
            keyring,
            nonces: Arc::new(NonceAllocator::new()),
            ledger,
            notifier: Arc::new(LogNotifier),
            policy: RetryPolicy::from_config(config),
            submit_timeout: Duration::from_millis(config.submit_timeout_ms),
        }
    }

    /// Send interim progress messages to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Share a nonce allocator with other submitters.
    pub fn with_nonce_allocator(mut self, nonces: Arc<NonceAllocator>) -> Self {
        self.nonces = nonces;
        self
    }

    pub fn keyring(&self) -> &KeyRing {
        &self.keyring
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    pub fn remote(&self) -> &L {
        &self.remote
    }

    /// Submit one request and record its terminal outcome.
    ///
    /// Returns `Err` only for pre-flight failures (unknown credential,
    /// insufficient or unreadable balance); those consume no nonce and are
    /// not written to the ledger. Every other path yields exactly one
    /// [`SubmissionResult`], appended to the ledger before returning.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, SubmitError> {
        let address = request.address;
        if !self.keyring.contains(&address) {
            return Err(SubmitError::UnknownCredential(address));
        }
        self.check_balance(request).await?;

        let started = Instant::now();
        let mut lease = self.nonces.lease(address).await;
        let mut attempt = 0;

        let result = loop {
            attempt += 1;
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&mut lease, request).await {
                Ok((tx_hash, nonce)) => {
                    metrics::record_attempt("success");
                    tracing::info!(address = %address, nonce, attempt, tx_hash = %tx_hash, "Transaction submitted");
                    break SubmissionResult::success(address, tx_hash, nonce, attempt);
                }
                Err(e) => {
                    let kind = e.kind();
                    metrics::record_attempt(kind.as_str());

                    if e.is_retryable() && self.policy.should_retry(attempt) {
                        tracing::warn!(address = %address, attempt, error = %e, "Submission attempt failed, retrying");
                        self.notifier.notify(&format!(
                            "{}: attempt {}/{} failed ({}), retrying",
                            address,
                            attempt,
                            self.policy.max_attempts(),
                            e
                        ));
                        continue;
                    }

                    let message = if e.is_retryable() {
                        RetriesExhausted { attempts: attempt, last: e }.to_string()
                    } else {
                        e.to_string()
                    };
                    tracing::error!(address = %address, attempts = attempt, error = %message, "Submission failed");
                    break SubmissionResult::failed(address, kind, message, attempt);
                }
            }
        };
        drop(lease);

        let status = if result.is_success() { "success" } else { "failed" };
        metrics::record_submission(status, started.elapsed());
        self.ledger.append(&result).await;
        Ok(result)
    }

    async fn check_balance(&self, request: &SubmissionRequest) -> Result<(), SubmitError> {
        let address = request.address;
        let balance = self
            .remote
            .get_balance(address)
            .await
            .map_err(|source| SubmitError::BalanceUnavailable { address, source })?;

        let required = request.max_cost();
        if balance < required {
            tracing::warn!(address = %address, %balance, %required, "Insufficient balance for gas");
            return Err(SubmitError::InsufficientBalance {
                address,
                balance,
                required,
            });
        }
        Ok(())
    }

    /// One pass through Building → Signed → Submitted.
    async fn attempt(
        &self,
        lease: &mut NonceLease,
        request: &SubmissionRequest,
    ) -> Result<(TxHash, u64), AttemptError> {
        let nonce = lease
            .next(self.remote.as_ref())
            .await
            .map_err(|e| AttemptError::NonceUnavailable(e.to_string()))?;

        let envelope = request.envelope(nonce);
        let signed = self
            .keyring
            .sign(request.address, &envelope)
            .map_err(|e| AttemptError::Signing(e.to_string()))?;

        tracing::debug!(address = %request.address, nonce, tx_hash = %signed.hash, "Broadcasting transaction");

        match race(
            self.submit_timeout,
            self.remote.submit_signed_transaction(signed.raw.clone()),
        )
        .await
        {
            Deadline::Completed(Ok(tx_hash)) => {
                if tx_hash != signed.hash {
                    tracing::warn!(local = %signed.hash, remote = %tx_hash, "Node reported a different transaction hash");
                }
                Ok((tx_hash, nonce))
            }
            Deadline::Completed(Err(e)) => Err(AttemptError::Rejected(e.to_string())),
            Deadline::Elapsed(limit) => {
                tracing::warn!(address = %request.address, nonce, tx_hash = %signed.hash, "Broadcast timed out, transaction may still land");
                Err(AttemptError::Timeout(limit))
            }
        }
    }
}
