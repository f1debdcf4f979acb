//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mintbot_submissions_total` (counter): terminal outcomes by status
//! - `mintbot_submission_attempts_total` (counter): attempts by outcome
//! - `mintbot_submission_duration_seconds` (histogram): request latency including retries
//! - `mintbot_ledger_entries` (gauge): retained ledger entries
//! - `mintbot_keyring_credentials` (gauge): loaded signing keys

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(status: &'static str, duration: Duration) {
    counter!("mintbot_submissions_total", "status" => status).increment(1);
    histogram!("mintbot_submission_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_attempt(outcome: &'static str) {
    counter!("mintbot_submission_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_ledger_size(entries: usize) {
    gauge!("mintbot_ledger_entries").set(entries as f64);
}

pub fn record_keyring_size(credentials: usize) {
    gauge!("mintbot_keyring_credentials").set(credentials as f64);
}
