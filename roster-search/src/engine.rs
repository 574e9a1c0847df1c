//! Query-time entry point: scan the directory, keep the best hits

use std::path::PathBuf;
use std::time::Instant;

use roster_core::Result;
use tracing::{debug, warn};

use crate::index::SearchIndex;
use crate::ranking::{SearchHit, TopKHeap};
use crate::similarity::Scorer;

/// Search-side tuning knobs.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Hits scoring below this are never returned.
    pub min_similarity: f64,
    /// Maximum allowed limit for one search.
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            min_similarity: 0.4,
            max_limit: 1000,
        }
    }
}

/// Fuzzy name search over the crawled roster.
pub struct SearchEngine {
    index: SearchIndex,
    config: SearchConfig,
}

impl SearchEngine {
    /// Point the engine at a store. The directory is built lazily by the
    /// first search.
    pub fn open(store_path: impl Into<PathBuf>, config: SearchConfig) -> Self {
        SearchEngine {
            index: SearchIndex::new(store_path),
            config,
        }
    }

    pub fn with_defaults(store_path: impl Into<PathBuf>) -> Self {
        Self::open(store_path, SearchConfig::default())
    }

    /// Wrap an existing index handle.
    pub fn with_index(index: SearchIndex, config: SearchConfig) -> Self {
        SearchEngine { index, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rank directory entries against `query`, best first.
    ///
    /// Returns at most `limit` hits at or above the similarity floor,
    /// ordered by similarity descending with ties broken by ascending id.
    /// An empty or whitespace-only query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let scorer = Scorer::new(query);
        if scorer.is_empty() {
            debug!("query normalized to empty, returning no hits");
            return Ok(Vec::new());
        }

        let clamped = limit.min(self.config.max_limit);
        if limit > self.config.max_limit {
            warn!(
                requested = limit,
                max = self.config.max_limit,
                "limit clamped to max"
            );
        }
        if clamped == 0 {
            return Ok(Vec::new());
        }

        let rows = self.index.ensure_ready()?;

        let started = Instant::now();
        let mut heap = TopKHeap::new(clamped);
        for row in rows.iter() {
            let similarity = scorer.score(&row.name_norm);
            if similarity >= self.config.min_similarity {
                heap.offer(row.id, &row.display_name, similarity);
            }
        }
        let hits = heap.into_ranked();
        debug!(
            query = scorer.query_norm(),
            hits = hits.len(),
            scanned = rows.len(),
            took_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(hits)
    }
}
