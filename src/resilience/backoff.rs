//! Exponential backoff with jitter between submission attempts.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `retry` (0 = first attempt, no delay).
///
/// Doubles from `base_ms` per retry, capped at `max_ms`, plus up to 10% jitter.
pub fn calculate_backoff(retry: u32, base_ms: u64, max_ms: u64) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u64.saturating_pow(retry - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}
