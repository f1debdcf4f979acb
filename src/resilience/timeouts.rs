//! Timeout enforcement.
//!
//! `race` drops the losing future when the deadline fires, which aborts the
//! local request. It cannot retract anything the remote side already
//! received, so callers must treat [`Deadline::Elapsed`] as "outcome unknown"
//! rather than "not applied".

use std::future::Future;
use std::time::Duration;

/// Result of racing a future against a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deadline<T> {
    /// The future finished in time.
    Completed(T),
    /// The deadline fired first.
    Elapsed(Duration),
}

/// Run `fut` with a deadline of `limit`.
pub async fn race<F: Future>(limit: Duration, fut: F) -> Deadline<F::Output> {
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => Deadline::Completed(output),
        Err(_) => Deadline::Elapsed(limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_before_deadline() {
        let result = race(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(result, Deadline::Completed(7));
    }

    #[tokio::test]
    async fn test_elapses() {
        let result = race(
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;
        assert_eq!(result, Deadline::Elapsed(Duration::from_millis(10)));
    }
}
