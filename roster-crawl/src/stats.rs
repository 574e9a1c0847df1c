//! Per-run counters and the end-of-run summary

use std::time::Duration;

use roster_client::OutcomeKind;

/// Terminal-outcome counters for one crawl run.
///
/// Every ID in the crawled range lands in exactly one terminal counter, so
/// for an uninterrupted run `resolved()` equals the range size.
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// IDs that resolved to a record
    pub found: u64,
    /// IDs the endpoint confirmed absent
    pub not_found: u64,
    /// IDs dropped after exhausting their budget on rate limiting
    pub rate_limited_dropped: u64,
    /// IDs dropped after exhausting their budget on transient failures
    pub transient_dropped: u64,
    /// IDs dropped after exhausting their budget on malformed responses
    pub malformed_dropped: u64,
    /// Total requeued attempts across all IDs
    pub retries: u64,
    /// Batches flushed and checkpointed
    pub batches_completed: u64,
    /// Rows reported written by the writer
    pub rows_written: u64,
    /// Boundary loaded from the checkpoint at startup, if any
    pub resumed_from: Option<u64>,
    /// Whether the run stopped on a cancellation request
    pub interrupted: bool,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn record_terminal(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Found => self.found += 1,
            OutcomeKind::NotFound => self.not_found += 1,
            OutcomeKind::RateLimited => self.rate_limited_dropped += 1,
            OutcomeKind::TransientError => self.transient_dropped += 1,
            OutcomeKind::MalformedResponse => self.malformed_dropped += 1,
        }
    }

    /// IDs dropped without a definitive answer.
    pub fn dropped(&self) -> u64 {
        self.rate_limited_dropped + self.transient_dropped + self.malformed_dropped
    }

    /// IDs that reached a terminal outcome.
    pub fn resolved(&self) -> u64 {
        self.found + self.not_found + self.dropped()
    }
}
