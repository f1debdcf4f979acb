//! Human-readable status notifications.
//!
//! The submission engine reports progress through a [`Notifier`] and never
//! formats for a particular front end. Any `Fn(&str)` closure is a notifier.

/// Receives one-line status messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "mint_bot::notify", "{}", message);
    }
}
