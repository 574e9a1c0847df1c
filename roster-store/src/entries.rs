//! The entries table: upsert-by-id writes and bulk reads

use roster_core::{EntryRecord, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::map_sqlite_error;

/// Upsert a slice of records, stamping each with `fetched_at`.
///
/// Repeated flushes of overlapping IDs overwrite in place, so re-fetching a
/// batch after a crash never duplicates rows. Callers wrap this in a
/// transaction; one transaction per crawl batch.
pub fn upsert_batch(conn: &Connection, records: &[EntryRecord], fetched_at: i64) -> Result<usize> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO entries
                 (id, display_name, owner_name, region, metric_a, metric_b, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 display_name = excluded.display_name,
                 owner_name   = excluded.owner_name,
                 region       = excluded.region,
                 metric_a     = excluded.metric_a,
                 metric_b     = excluded.metric_b,
                 fetched_at   = excluded.fetched_at",
        )
        .map_err(map_sqlite_error)?;

    for record in records {
        stmt.execute(params![
            record.id,
            record.display_name,
            record.owner_name,
            record.region,
            record.metric_a,
            record.metric_b,
            fetched_at,
        ])
        .map_err(map_sqlite_error)?;
    }
    Ok(records.len())
}

/// Total number of stored entries.
pub fn count(conn: &Connection) -> Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
        .map_err(map_sqlite_error)
}

/// Most recent `fetched_at` across all entries; `None` when the table is
/// empty.
pub fn max_fetched_at(conn: &Connection) -> Result<Option<i64>> {
    conn.query_row("SELECT MAX(fetched_at) FROM entries", [], |row| row.get(0))
        .map_err(map_sqlite_error)
}

/// Look up one entry by ID.
pub fn get(conn: &Connection, id: u64) -> Result<Option<EntryRecord>> {
    conn.query_row(
        "SELECT id, display_name, owner_name, region, metric_a, metric_b
         FROM entries WHERE id = ?1",
        params![id],
        |row| {
            Ok(EntryRecord {
                id: row.get(0)?,
                display_name: row.get(1)?,
                owner_name: row.get(2)?,
                region: row.get(3)?,
                metric_a: row.get(4)?,
                metric_b: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(map_sqlite_error)
}
