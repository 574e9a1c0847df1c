//! Bulk ingestion of the remote entry directory
//!
//! # Architecture
//!
//! A crawl walks a contiguous ID range in fixed-size batches. Within a batch
//! the [`Crawler`] keeps up to `concurrency` fetches in flight and routes
//! every completion through the [`Governor`], which decides between a
//! terminal outcome, an immediate requeue, and a backoff-delayed requeue.
//! Found records collect in a [`BatchAccumulator`]; when the batch drains the
//! driver hands the whole batch to a [`BatchWriter`] in one call and only
//! then advances the [`CheckpointFile`]. Flush-before-advance means a crash
//! never loses acknowledged work: at worst the next run re-fetches one batch
//! and the store's upsert absorbs the overlap.

pub mod accumulator;
pub mod backoff;
pub mod cancel;
pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod governor;
pub mod stats;
pub mod writer;

pub use accumulator::BatchAccumulator;
pub use backoff::Backoff;
pub use cancel::CancelFlag;
pub use checkpoint::{resume_start, CheckpointFile};
pub use config::CrawlConfig;
pub use crawler::Crawler;
pub use governor::{Decision, Governor};
pub use stats::CrawlStats;
pub use writer::{BatchWriter, StoreWriter};
