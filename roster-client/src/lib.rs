//! Remote entry client
//!
//! Issues one read request per ID against the remote directory endpoint and
//! classifies the result. The [`EntryFetcher`] trait is the seam the crawl
//! driver works against; [`HttpEntryClient`] is the production
//! implementation. Retry and backoff policy belong to the caller.

pub mod fetcher;
pub mod http;
pub mod outcome;

pub use fetcher::EntryFetcher;
pub use http::{HttpEntryClient, DEFAULT_TIMEOUT_SECS};
pub use outcome::{FetchOutcome, OutcomeKind};
