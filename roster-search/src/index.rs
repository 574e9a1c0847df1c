//! Directory index lifecycle
//!
//! # Architecture
//!
//! The searchable directory moves through three states: unbuilt, building,
//! ready. The first search (or any search after the index is found stale)
//! builds it: open the store, refresh the directory projection if it lags
//! the entries table, then bulk-load it into memory. One thread builds at a
//! time; concurrent searchers block on a condvar until the build settles. A
//! failed build returns the index to unbuilt so the next search retries
//! instead of serving stale or empty results forever.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use roster_core::{Error, Result};
use roster_store::{directory, DirectoryEntry, StoreConfig, Storage};
use tracing::{debug, info, warn};

/// Retry schedule when another process holds the store lock during a build:
/// a fixed pause between attempts, then give up.
pub const LOCK_RETRY_ATTEMPTS: u32 = 30;
pub const LOCK_RETRY_PAUSE: Duration = Duration::from_secs(1);

enum IndexState {
    Unbuilt,
    Building,
    Ready(Arc<Vec<DirectoryEntry>>),
}

/// Shared handle to the in-memory directory with build-once coordination.
pub struct SearchIndex {
    store_path: PathBuf,
    state: Mutex<IndexState>,
    settled: Condvar,
    lock_attempts: u32,
    lock_pause: Duration,
}

impl SearchIndex {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self::with_lock_retry(store_path, LOCK_RETRY_ATTEMPTS, LOCK_RETRY_PAUSE)
    }

    /// Same handle with a custom lock-retry schedule.
    pub fn with_lock_retry(
        store_path: impl Into<PathBuf>,
        lock_attempts: u32,
        lock_pause: Duration,
    ) -> Self {
        SearchIndex {
            store_path: store_path.into(),
            state: Mutex::new(IndexState::Unbuilt),
            settled: Condvar::new(),
            lock_attempts,
            lock_pause,
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Hand out the current directory, building or rebuilding first when
    /// needed. Blocks while another thread builds.
    pub fn ensure_ready(&self) -> Result<Arc<Vec<DirectoryEntry>>> {
        loop {
            let mut state = self.state.lock();
            match &*state {
                IndexState::Ready(rows) => {
                    let rows = Arc::clone(rows);
                    drop(state);
                    if !self.probe_stale()? {
                        return Ok(rows);
                    }
                    debug!("directory index is stale, scheduling rebuild");
                    let mut state = self.state.lock();
                    if let IndexState::Ready(current) = &*state {
                        // Another thread may already have rebuilt; only
                        // demote the generation we probed.
                        if Arc::ptr_eq(current, &rows) {
                            *state = IndexState::Unbuilt;
                        }
                    }
                }
                IndexState::Building => {
                    self.settled.wait(&mut state);
                }
                IndexState::Unbuilt => {
                    *state = IndexState::Building;
                    drop(state);
                    let built = self.build();
                    let mut state = self.state.lock();
                    match built {
                        Ok(rows) => {
                            let rows = Arc::new(rows);
                            *state = IndexState::Ready(Arc::clone(&rows));
                            drop(state);
                            self.settled.notify_all();
                            return Ok(rows);
                        }
                        Err(e) => {
                            *state = IndexState::Unbuilt;
                            drop(state);
                            self.settled.notify_all();
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    fn probe_stale(&self) -> Result<bool> {
        let storage = Storage::open_at(&self.store_path)?;
        directory::is_stale(storage.connection())
    }

    /// Drive one build through the lock-retry schedule.
    fn build(&self) -> Result<Vec<DirectoryEntry>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_build() {
                Ok(rows) => return Ok(rows),
                Err(Error::StoreBusy(reason)) if attempt < self.lock_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.lock_attempts,
                        %reason,
                        "store is locked, retrying in {:?}",
                        self.lock_pause
                    );
                    std::thread::sleep(self.lock_pause);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One build attempt: open the store, refresh the directory projection
    /// if it lags the entries table, and load it whole.
    fn try_build(&self) -> Result<Vec<DirectoryEntry>> {
        // Busy surfaces immediately; the retry schedule above owns the
        // waiting.
        let config = StoreConfig {
            busy_timeout_ms: 0,
            ..StoreConfig::at(&self.store_path)
        };
        let mut storage = Storage::open(config)?;
        if directory::is_stale(storage.connection())? {
            info!("directory index lags the entry table, rebuilding");
            let rows = storage.transaction(directory::rebuild)?;
            info!(rows, "directory index rebuilt");
        }
        let rows = directory::load(storage.connection())?;
        info!(rows = rows.len(), "directory index loaded");
        Ok(rows)
    }
}
