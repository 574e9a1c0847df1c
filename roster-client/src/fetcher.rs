//! Fetcher trait, the seam between the crawl driver and the wire

use crate::outcome::FetchOutcome;
use async_trait::async_trait;

/// Resolves one ID against the remote directory.
///
/// Implementations classify every possible result into a [`FetchOutcome`]
/// rather than returning errors; a fetch attempt always produces exactly one
/// outcome. Tests substitute scripted implementations for the HTTP client.
#[async_trait]
pub trait EntryFetcher: Send + Sync {
    async fn fetch(&self, id: u64) -> FetchOutcome;
}
