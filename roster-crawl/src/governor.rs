//! Retry and concurrency policy
//!
//! The governor is the single owner of backoff logic. The fetch client never
//! retries; the driver asks the governor what to do with each outcome and
//! how many requests may be in flight.

use std::time::Duration;

use roster_client::OutcomeKind;

use crate::backoff::Backoff;

/// What the driver should do with an ID after one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The outcome is final for this run
    Terminal,
    /// Put the ID back on the queue for an immediate retry
    Requeue,
    /// Retry the ID after the given delay
    RequeueAfter(Duration),
}

/// Concurrency bound plus per-ID retry policy.
#[derive(Debug, Clone)]
pub struct Governor {
    concurrency: usize,
    max_attempts: u32,
    backoff: Backoff,
}

impl Governor {
    pub fn new(concurrency: usize, max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            concurrency,
            max_attempts,
            backoff,
        }
    }

    /// Maximum number of in-flight requests.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide the fate of an ID whose attempt number `attempt` (1-based)
    /// finished with `kind`.
    ///
    /// `Found` and `NotFound` are terminal on first occurrence. Rate-limited
    /// IDs requeue with exponential backoff rather than being dropped;
    /// transient and malformed outcomes requeue immediately. All retryable
    /// outcomes share the per-ID attempt budget, so a persistently hostile
    /// endpoint cannot pin a batch forever.
    pub fn decide(&self, kind: OutcomeKind, attempt: u32) -> Decision {
        match kind {
            OutcomeKind::Found | OutcomeKind::NotFound => Decision::Terminal,
            _ if attempt >= self.max_attempts => Decision::Terminal,
            OutcomeKind::RateLimited => {
                Decision::RequeueAfter(self.backoff.delay_for(attempt - 1))
            }
            OutcomeKind::TransientError | OutcomeKind::MalformedResponse => Decision::Requeue,
        }
    }
}
