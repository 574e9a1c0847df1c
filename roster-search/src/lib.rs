//! Fuzzy lookup over the crawled roster
//!
//! # Architecture
//!
//! Search is a brute-force scan: the directory projection (id, display name,
//! normalized name) is bulk-loaded into memory once, then every query scores
//! all rows with normalized Levenshtein similarity and keeps the top k in a
//! min-heap. The [`index`] module owns the load lifecycle, including the
//! staleness check against the store and the locked-store retry schedule;
//! [`similarity`] and [`ranking`] are pure and independently testable.

pub mod engine;
pub mod index;
pub mod ranking;
pub mod similarity;

pub use engine::{SearchConfig, SearchEngine};
pub use index::SearchIndex;
pub use ranking::{SearchHit, TopKHeap};
pub use similarity::Scorer;
