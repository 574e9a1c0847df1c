//! Core types shared across the roster workspace
//!
//! Holds the data model (`EntryRecord`), the shared error type, ID-range
//! batch planning, and the display-name normalization used by both the
//! directory build and the query path. No I/O lives here.

pub mod batch;
pub mod entry;
pub mod error;
pub mod normalize;

pub use batch::{plan_batches, BatchPlan};
pub use entry::EntryRecord;
pub use error::{Error, Result};
pub use normalize::normalize_name;
