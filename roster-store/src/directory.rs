//! The directory artifact: precomputed lookup rows derived from entries
//!
//! `directory` is rebuilt wholesale (never incrementally patched) whenever
//! the entries table has changed since the last build. The meta table records
//! the source row count and fetch watermark at build time so staleness is a
//! cheap comparison.

use roster_core::{normalize_name, Error, Result};
use rusqlite::{params, Connection};
use tracing::info;

use crate::connection::map_sqlite_error;
use crate::entries;
use crate::schema::{self, META_DIRECTORY_ROWS, META_DIRECTORY_WATERMARK};

/// Rows between coarse progress log lines during a rebuild.
const PROGRESS_INTERVAL: u64 = 500_000;

/// One directory row, as held in memory for query serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: u64,
    pub display_name: String,
    pub name_norm: String,
}

/// Whether the artifact must be (re)built before serving queries.
///
/// True when the directory has never been built, or when the entries table
/// changed underneath it: row count differs, or rows were fetched after the
/// recorded watermark.
pub fn is_stale(conn: &Connection) -> Result<bool> {
    let (Some(rows), Some(watermark)) = (
        schema::get_meta(conn, META_DIRECTORY_ROWS)?,
        schema::get_meta(conn, META_DIRECTORY_WATERMARK)?,
    ) else {
        return Ok(true);
    };
    let built_rows: u64 = parse_meta(META_DIRECTORY_ROWS, &rows)?;
    let built_watermark: i64 = parse_meta(META_DIRECTORY_WATERMARK, &watermark)?;

    Ok(entries::count(conn)? != built_rows
        || entries::max_fetched_at(conn)?.unwrap_or(0) > built_watermark)
}

/// Rebuild the artifact from the entries table.
///
/// Streams every entry, precomputes its normalized name, and rewrites the
/// directory in place, then records the build watermark. Runs inside the
/// caller's transaction so a failed build leaves the previous artifact
/// intact.
pub fn rebuild(tx: &rusqlite::Transaction<'_>) -> Result<u64> {
    tx.execute("DELETE FROM directory", [])
        .map_err(map_sqlite_error)?;

    let mut read = tx
        .prepare("SELECT id, display_name, fetched_at FROM entries ORDER BY id")
        .map_err(map_sqlite_error)?;
    let mut write = tx
        .prepare("INSERT INTO directory (id, display_name, name_norm) VALUES (?1, ?2, ?3)")
        .map_err(map_sqlite_error)?;

    let mut rows = read.query([]).map_err(map_sqlite_error)?;
    let mut built = 0u64;
    let mut watermark = 0i64;
    while let Some(row) = rows.next().map_err(map_sqlite_error)? {
        let id: u64 = row.get(0).map_err(map_sqlite_error)?;
        let name: String = row.get(1).map_err(map_sqlite_error)?;
        let fetched_at: i64 = row.get(2).map_err(map_sqlite_error)?;
        write
            .execute(params![id, name, normalize_name(&name)])
            .map_err(map_sqlite_error)?;
        watermark = watermark.max(fetched_at);
        built += 1;
        if built % PROGRESS_INTERVAL == 0 {
            info!(rows = built, "directory build in progress");
        }
    }

    schema::set_meta(tx, META_DIRECTORY_ROWS, &built.to_string())?;
    schema::set_meta(tx, META_DIRECTORY_WATERMARK, &watermark.to_string())?;
    Ok(built)
}

/// Bulk-load every directory row, ordered by ascending id.
pub fn load(conn: &Connection) -> Result<Vec<DirectoryEntry>> {
    let cap: u64 = conn
        .query_row("SELECT COUNT(*) FROM directory", [], |row| row.get(0))
        .map_err(map_sqlite_error)?;

    let mut stmt = conn
        .prepare("SELECT id, display_name, name_norm FROM directory ORDER BY id")
        .map_err(map_sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DirectoryEntry {
                id: row.get(0)?,
                display_name: row.get(1)?,
                name_norm: row.get(2)?,
            })
        })
        .map_err(map_sqlite_error)?;

    let mut out = Vec::with_capacity(cap as usize);
    for row in rows {
        out.push(row.map_err(map_sqlite_error)?);
    }
    Ok(out)
}

fn parse_meta<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::store(format!("corrupt {key} meta value: {value:?}")))
}
