//! Per-batch collection of successfully fetched records
//!
//! Owned by the driver task, which receives every fetch result as a future
//! completion. Results arrive by message passing rather than through a
//! shared locked collection, so appends need no synchronization.

use roster_core::EntryRecord;

/// Accumulates one batch's worth of `Found` records between flushes.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    records: Vec<EntryRecord>,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: EntryRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return everything accumulated and reset to empty.
    pub fn drain(&mut self) -> Vec<EntryRecord> {
        std::mem::take(&mut self.records)
    }
}
