//! Fixed-size batch slicing of an inclusive ID range
//!
//! A batch is a contiguous slice of the ID space processed as one atomic unit
//! of flush + checkpoint. Batches are planned up front so the driver can log
//! `[i/total]` progress and so peak memory stays bounded by one batch.

use crate::error::{Error, Result};

/// A contiguous, inclusive slice of the ID space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    /// First ID in the batch (inclusive)
    pub first: u64,
    /// Last ID in the batch (inclusive); also the checkpoint boundary once
    /// the batch is durably flushed
    pub last: u64,
    /// Zero-based position within the run
    pub index: usize,
    /// Total number of batches in the run
    pub total: usize,
}

impl BatchPlan {
    /// Number of IDs covered by this batch.
    pub fn count(&self) -> u64 {
        self.last - self.first + 1
    }

    /// Iterate the IDs of this batch in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u64> {
        self.first..=self.last
    }
}

/// Slice `[start, end]` into batches of at most `batch_size` IDs.
///
/// An empty plan (start past end) is a valid result: a resumed run whose
/// checkpoint already covers the range has nothing left to do.
pub fn plan_batches(start: u64, end: u64, batch_size: u64) -> Result<Vec<BatchPlan>> {
    if batch_size == 0 {
        return Err(Error::invalid_range("batch size must be at least 1"));
    }
    if start == 0 {
        return Err(Error::invalid_range("IDs are numbered from 1"));
    }
    if start > end {
        return Ok(Vec::new());
    }

    let span = end - start + 1;
    let total = span.div_ceil(batch_size) as usize;
    let mut plans = Vec::with_capacity(total);
    let mut first = start;
    let mut index = 0usize;
    while first <= end {
        let last = first.saturating_add(batch_size - 1).min(end);
        plans.push(BatchPlan {
            first,
            last,
            index,
            total,
        });
        index += 1;
        if last == end {
            break;
        }
        first = last + 1;
    }
    Ok(plans)
}
