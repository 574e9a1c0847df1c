//! Store connection lifecycle: open, pragmas, transactions

use std::fmt;
use std::path::{Path, PathBuf};

use roster_core::{Error, Result};
use rusqlite::Connection;
use tracing::debug;

use crate::schema;

/// Connection settings for the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub wal_mode: bool,
    /// How long SQLite itself waits on a busy lock before erroring.
    /// Callers that implement their own retry loop set this to 0.
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            path: path.into(),
            ..StoreConfig::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from("roster.db"),
            wal_mode: true,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Handle on the durable store. One writer per process at a time; readers
/// may open their own handles concurrently.
pub struct Storage {
    conn: Connection,
    config: StoreConfig,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("path", &self.config.path)
            .field("wal_mode", &self.config.wal_mode)
            .finish_non_exhaustive()
    }
}

impl Storage {
    /// Open (creating if absent) the store at the configured path and
    /// bootstrap the schema.
    pub fn open(config: StoreConfig) -> Result<Self> {
        debug!(
            path = %config.path.display(),
            wal_mode = config.wal_mode,
            busy_timeout_ms = config.busy_timeout_ms,
            "opening store"
        );
        let conn = Connection::open(&config.path).map_err(map_sqlite_error)?;
        let storage = Storage { conn, config };
        storage.apply_pragmas()?;
        schema::bootstrap(&storage.conn)?;
        Ok(storage)
    }

    /// Open with default settings at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(StoreConfig::at(path.as_ref()))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `f` inside a transaction; commit on `Ok`, roll back on `Err`.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let tx = self.conn.transaction().map_err(map_sqlite_error)?;
        let value = f(&tx)?;
        tx.commit().map_err(map_sqlite_error)?;
        Ok(value)
    }

    fn apply_pragmas(&self) -> Result<()> {
        if self.config.wal_mode {
            self.conn
                .execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
                .map_err(map_sqlite_error)?;
        }
        self.conn
            .execute_batch(&format!(
                "PRAGMA busy_timeout={};",
                self.config.busy_timeout_ms
            ))
            .map_err(map_sqlite_error)?;
        Ok(())
    }
}

/// Map a rusqlite error onto the shared error type, keeping busy/locked
/// separate so callers can retry them.
pub(crate) fn map_sqlite_error(e: rusqlite::Error) -> Error {
    if is_busy(&e) {
        Error::store_busy(e.to_string())
    } else {
        Error::store(e.to_string())
    }
}

fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}
