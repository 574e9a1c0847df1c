//! The batch crawl driver
//!
//! A single task owns the whole batch lifecycle: it tops a `FuturesUnordered`
//! up to the concurrency bound, receives every fetch result as a future
//! completion, and applies the governor's decision to each. Results flow back
//! to the driver by message passing, so the accumulator is plain owned state
//! with no lock. Batches are strictly sequential: one batch fully drains,
//! flushes, and checkpoints before the next batch is planned, which bounds
//! peak memory to a single batch.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use roster_client::{EntryFetcher, FetchOutcome, OutcomeKind};
use roster_core::{plan_batches, BatchPlan, Result};
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};

use crate::accumulator::BatchAccumulator;
use crate::backoff::Backoff;
use crate::cancel::CancelFlag;
use crate::checkpoint::{resume_start, CheckpointFile};
use crate::config::CrawlConfig;
use crate::governor::{Decision, Governor};
use crate::stats::CrawlStats;
use crate::writer::BatchWriter;

/// How often the driver wakes to notice cancellation when no fetch has
/// completed and no retry is due.
const CANCEL_TICK: Duration = Duration::from_millis(100);

type FetchFuture = Pin<Box<dyn Future<Output = (WorkItem, FetchOutcome)> + Send>>;

/// One queued fetch: the ID plus which attempt this will be (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct WorkItem {
    id: u64,
    attempt: u32,
}

impl WorkItem {
    fn first(id: u64) -> Self {
        WorkItem { id, attempt: 1 }
    }

    fn next(self) -> Self {
        WorkItem {
            id: self.id,
            attempt: self.attempt + 1,
        }
    }
}

/// A backoff-delayed retry, ordered by readiness.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct RetryEntry {
    ready_at: Instant,
    item: WorkItem,
}

/// Drives a crawl over an ID range against an [`EntryFetcher`].
pub struct Crawler<F> {
    fetcher: Arc<F>,
    governor: Governor,
    config: CrawlConfig,
}

impl<F: EntryFetcher + 'static> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let governor = Governor::new(
            config.concurrency,
            config.max_attempts,
            Backoff::new(config.retry_base_ms, config.retry_max_ms),
        );
        Ok(Self {
            fetcher: Arc::new(fetcher),
            governor,
            config,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Run the crawl to completion, cancellation, or the first fatal error.
    ///
    /// Per batch: drain every ID to a terminal outcome, flush the accumulated
    /// records (exactly one writer call), then advance the checkpoint. A
    /// flush or checkpoint failure aborts the run with the checkpoint still
    /// pointing at the last durable batch.
    pub async fn run<W: BatchWriter>(
        &self,
        writer: &mut W,
        mut checkpoint: Option<&mut CheckpointFile>,
        cancel: &CancelFlag,
    ) -> Result<CrawlStats> {
        let started = Instant::now();
        let mut stats = CrawlStats::default();

        let boundary = match checkpoint.as_mut() {
            Some(cp) => cp.load()?,
            None => None,
        };
        let first_id = resume_start(self.config.start, boundary);
        if let Some(b) = boundary {
            stats.resumed_from = Some(b);
            info!(boundary = b, resume = first_id, "resuming from checkpoint");
        }

        let plans = plan_batches(first_id, self.config.end, self.config.batch_size)?;
        if plans.is_empty() {
            info!("nothing to do: checkpoint already covers the range");
            stats.elapsed = started.elapsed();
            return Ok(stats);
        }
        info!(
            start = first_id,
            end = self.config.end,
            batches = plans.len(),
            concurrency = self.config.concurrency,
            "starting crawl"
        );

        let mut acc = BatchAccumulator::new();
        for plan in &plans {
            if cancel.is_cancelled() {
                stats.interrupted = true;
                break;
            }

            let batch_started = Instant::now();
            if !self.run_batch(plan, &mut acc, &mut stats, cancel).await {
                stats.interrupted = true;
                info!(
                    batch = plan.index + 1,
                    "cancelled; abandoning in-flight requests"
                );
                break;
            }

            let records = acc.drain();
            let written = writer.flush(&records)?;
            stats.rows_written += written as u64;
            if let Some(cp) = checkpoint.as_mut() {
                cp.advance(plan.last)?;
            }
            stats.batches_completed += 1;

            let secs = batch_started.elapsed().as_secs_f64();
            let rate = plan.count() as f64 / secs.max(f64::EPSILON);
            info!(
                "[{}/{}] ids {}..{}: {} written in {:.1}s ({:.0} ids/s)  cumulative: {} found, {} not found, {} dropped",
                plan.index + 1,
                plan.total,
                plan.first,
                plan.last,
                written,
                secs,
                rate,
                stats.found,
                stats.not_found,
                stats.dropped()
            );

            if !self.config.batch_pause.is_zero() && plan.index + 1 < plan.total {
                time::sleep(self.config.batch_pause).await;
            }
        }

        stats.elapsed = started.elapsed();
        Ok(stats)
    }

    /// Drain one batch to terminal outcomes. Returns false when cancelled
    /// mid-batch, in which case pending and in-flight work is abandoned.
    async fn run_batch(
        &self,
        plan: &BatchPlan,
        acc: &mut BatchAccumulator,
        stats: &mut CrawlStats,
        cancel: &CancelFlag,
    ) -> bool {
        let mut pending: VecDeque<WorkItem> = plan.ids().map(WorkItem::first).collect();
        let mut retries: BinaryHeap<Reverse<RetryEntry>> = BinaryHeap::new();
        let mut in_flight: FuturesUnordered<FetchFuture> = FuturesUnordered::new();

        loop {
            if cancel.is_cancelled() {
                return false;
            }

            // Promote retries whose delay has elapsed.
            let now = Instant::now();
            while retries
                .peek()
                .is_some_and(|Reverse(entry)| entry.ready_at <= now)
            {
                if let Some(Reverse(entry)) = retries.pop() {
                    pending.push_back(entry.item);
                }
            }

            // Top the in-flight set up to the concurrency bound.
            while in_flight.len() < self.governor.concurrency() {
                let Some(item) = pending.pop_front() else {
                    break;
                };
                let fetcher = Arc::clone(&self.fetcher);
                in_flight.push(Box::pin(async move {
                    let outcome = fetcher.fetch(item.id).await;
                    (item, outcome)
                }));
            }

            if in_flight.is_empty() && pending.is_empty() && retries.is_empty() {
                return true;
            }

            // Wake on the next due retry, or at a coarse tick so a slow
            // endpoint cannot delay cancellation.
            let deadline = match retries.peek() {
                Some(Reverse(entry)) => entry.ready_at.min(now + CANCEL_TICK),
                None => now + CANCEL_TICK,
            };

            tokio::select! {
                biased;

                Some((item, outcome)) = in_flight.next() => {
                    self.settle(item, outcome, acc, stats, &mut pending, &mut retries);
                }

                _ = time::sleep_until(deadline) => {}
            }
        }
    }

    /// Apply the governor's decision to one completed fetch.
    fn settle(
        &self,
        item: WorkItem,
        outcome: FetchOutcome,
        acc: &mut BatchAccumulator,
        stats: &mut CrawlStats,
        pending: &mut VecDeque<WorkItem>,
        retries: &mut BinaryHeap<Reverse<RetryEntry>>,
    ) {
        let kind = outcome.kind();
        match self.governor.decide(kind, item.attempt) {
            Decision::Terminal => {
                if let FetchOutcome::Found(record) = outcome {
                    acc.append(record);
                } else if kind != OutcomeKind::NotFound {
                    warn!(
                        id = item.id,
                        attempts = item.attempt,
                        outcome = kind.as_str(),
                        "giving up on ID for this run"
                    );
                }
                stats.record_terminal(kind);
            }
            Decision::Requeue => {
                stats.retries += 1;
                debug!(
                    id = item.id,
                    attempt = item.attempt,
                    outcome = kind.as_str(),
                    "requeueing for retry"
                );
                pending.push_back(item.next());
            }
            Decision::RequeueAfter(delay) => {
                stats.retries += 1;
                debug!(
                    id = item.id,
                    attempt = item.attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                retries.push(Reverse(RetryEntry {
                    ready_at: Instant::now() + delay,
                    item: item.next(),
                }));
            }
        }
    }
}
