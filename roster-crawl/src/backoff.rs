//! Exponential backoff with jitter for rate-limited IDs

use std::time::Duration;

/// Exponential backoff calculator with jitter.
///
/// Stateless per call: the caller tracks how many times an ID has been
/// retried and asks for the delay of that retry.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    /// Backoff starting at `base_ms` with a cap of `max_ms`.
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry` capped
    /// at the max, plus up to 25% jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = self.base_ms.saturating_mul(1u64.wrapping_shl(retry.min(32)));
        let capped = exp.min(self.max_ms);
        let jitter = rand::random::<u64>() % (capped / 4 + 1);
        Duration::from_millis(capped + jitter)
    }
}
