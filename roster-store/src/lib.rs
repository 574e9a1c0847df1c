//! Durable store for the roster pipeline
//!
//! A single SQLite file holds three tables: `entries` (the union of every
//! record ever fetched, upserted by id), `directory` (the derived lookup
//! artifact with precomputed normalized names), and `meta` (schema version
//! and directory build watermark). The crawl side writes entries in
//! per-batch transactions; the search side rebuilds and bulk-loads the
//! directory.

pub mod connection;
pub mod directory;
pub mod entries;
pub mod schema;

pub use connection::{StoreConfig, Storage};
pub use directory::DirectoryEntry;
