//! Crawl run configuration

use std::time::Duration;

use roster_core::{Error, Result};

/// Operator-supplied settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// First ID of the range (inclusive)
    pub start: u64,
    /// Last ID of the range (inclusive)
    pub end: u64,
    /// Maximum number of in-flight requests
    pub concurrency: usize,
    /// IDs per batch; one flush + checkpoint advance per batch
    pub batch_size: u64,
    /// Total attempts allowed per ID within one run
    pub max_attempts: u32,
    /// Pause between batches
    pub batch_pause: Duration,
    /// First rate-limit backoff delay in milliseconds
    pub retry_base_ms: u64,
    /// Rate-limit backoff cap in milliseconds
    pub retry_max_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            start: 1,
            end: 12_000_000,
            concurrency: 100,
            batch_size: 100_000,
            max_attempts: 4,
            batch_pause: Duration::ZERO,
            retry_base_ms: 500,
            retry_max_ms: 10_000,
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(Error::invalid_range("start must be at least 1"));
        }
        if self.end < self.start {
            return Err(Error::invalid_range(format!(
                "end ({}) is before start ({})",
                self.end, self.start
            )));
        }
        if self.concurrency == 0 {
            return Err(Error::invalid_range("concurrency must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(Error::invalid_range("batch size must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(Error::invalid_range("max attempts must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CrawlConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let config = CrawlConfig {
            start: 100,
            end: 10,
            ..CrawlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_knobs() {
        for f in [
            |c: &mut CrawlConfig| c.start = 0,
            |c: &mut CrawlConfig| c.concurrency = 0,
            |c: &mut CrawlConfig| c.batch_size = 0,
            |c: &mut CrawlConfig| c.max_attempts = 0,
        ] {
            let mut config = CrawlConfig::default();
            f(&mut config);
            assert!(config.validate().is_err());
        }
    }
}
