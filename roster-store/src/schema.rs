//! Schema bootstrap and the meta key/value table

use roster_core::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::map_sqlite_error;

/// Current schema version, written on first bootstrap.
pub const SCHEMA_VERSION: i64 = 1;

pub const META_SCHEMA_VERSION: &str = "schema_version";
pub const META_DIRECTORY_ROWS: &str = "directory_rows";
pub const META_DIRECTORY_WATERMARK: &str = "directory_watermark";

/// Create all tables if absent and stamp the schema version.
///
/// Safe to call on every open; refuses to touch a store written by a newer
/// schema.
pub fn bootstrap(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS meta (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entries (
            id           INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL,
            owner_name   TEXT NOT NULL,
            region       TEXT,
            metric_a     INTEGER,
            metric_b     INTEGER,
            fetched_at   INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS directory (
            id           INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL,
            name_norm    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_fetched_at ON entries(fetched_at);
        ",
    )
    .map_err(map_sqlite_error)?;

    conn.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES (?1, ?2)",
        params![META_SCHEMA_VERSION, SCHEMA_VERSION.to_string()],
    )
    .map_err(map_sqlite_error)?;

    let version = current_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(Error::store(format!(
            "store schema version {version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }
    Ok(())
}

/// Schema version recorded in the store.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let value = get_meta(conn, META_SCHEMA_VERSION)?
        .ok_or_else(|| Error::store("store has no schema_version meta row"))?;
    value
        .parse()
        .map_err(|_| Error::store(format!("corrupt schema_version meta value: {value:?}")))
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(map_sqlite_error)
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(map_sqlite_error)?;
    Ok(())
}
