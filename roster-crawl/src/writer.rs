//! Batch persistence writer

use roster_core::{EntryRecord, Result};
use roster_store::{entries, Storage};

/// Flushes one batch's accumulated records to the durable store.
///
/// Invoked exactly once per batch, possibly with an empty slice. The flush
/// must be idempotent under overlapping IDs: a re-fetched batch overwrites
/// its own rows rather than duplicating them.
pub trait BatchWriter {
    /// Persist `records`, returning how many rows were written.
    fn flush(&mut self, records: &[EntryRecord]) -> Result<usize>;
}

/// Production writer: one store transaction per batch, upserting by id.
pub struct StoreWriter {
    storage: Storage,
}

impl StoreWriter {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl BatchWriter for StoreWriter {
    fn flush(&mut self, records: &[EntryRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let fetched_at = now_epoch_secs();
        self.storage
            .transaction(|tx| entries::upsert_batch(tx, records, fetched_at))
    }
}

fn now_epoch_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
