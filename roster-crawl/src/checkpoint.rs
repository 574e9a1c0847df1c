//! Durable crawl checkpoint
//!
//! A single ASCII integer in a standalone file: the last ID of the most
//! recent fully-persisted batch. Written with write-to-temp-then-rename so a
//! reader never observes a partial value. The checkpoint advances only after
//! the batch's flush succeeded; a crash between flush and advance just means
//! that batch is re-fetched (and harmlessly re-upserted) next run.

use std::fs;
use std::path::{Path, PathBuf};

use roster_core::{Error, Result};
use tracing::debug;

/// Handle on the checkpoint file. One writer per run.
#[derive(Debug)]
pub struct CheckpointFile {
    path: PathBuf,
    last: Option<u64>,
}

impl CheckpointFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CheckpointFile {
            path: path.into(),
            last: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last boundary recorded in memory (after `load` or `advance`).
    pub fn last(&self) -> Option<u64> {
        self.last
    }

    /// Read the stored boundary. A missing file means no previous run;
    /// an unreadable value is an error, never silently treated as absent.
    pub fn load(&mut self) -> Result<Option<u64>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.last = None;
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::checkpoint(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        let boundary: u64 = content.trim().parse().map_err(|_| {
            Error::checkpoint(format!(
                "unparseable checkpoint in {}: {:?}",
                self.path.display(),
                content.trim()
            ))
        })?;
        self.last = Some(boundary);
        Ok(Some(boundary))
    }

    /// Record `boundary` durably. Boundaries must be strictly increasing
    /// within a run.
    pub fn advance(&mut self, boundary: u64) -> Result<()> {
        if let Some(last) = self.last {
            if boundary <= last {
                return Err(Error::checkpoint(format!(
                    "boundary {boundary} does not advance past {last}"
                )));
            }
        }

        let tmp = tmp_path(&self.path)?;
        fs::write(&tmp, format!("{boundary}\n")).map_err(|e| {
            Error::checkpoint(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            Error::checkpoint(format!(
                "failed to rename {} to {}: {e}",
                tmp.display(),
                self.path.display()
            ))
        })?;

        self.last = Some(boundary);
        debug!(boundary, path = %self.path.display(), "checkpoint advanced");
        Ok(())
    }
}

/// Where a run should begin given the operator start and a loaded boundary.
pub fn resume_start(operator_start: u64, boundary: Option<u64>) -> u64 {
    match boundary {
        Some(b) => operator_start.max(b.saturating_add(1)),
        None => operator_start,
    }
}

fn tmp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::checkpoint(format!("invalid checkpoint path {}", path.display())))?;
    let mut tmp = path.to_path_buf();
    tmp.set_file_name(format!("{file_name}.tmp"));
    Ok(tmp)
}
