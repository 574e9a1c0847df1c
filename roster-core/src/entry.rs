//! Entry records resolved from the remote directory

use serde::{Deserialize, Serialize};

/// One resolved directory entity.
///
/// Produced by the remote entry client on a successful parse; immutable once
/// written. `id` is the identity key for all upserts downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: u64,
    pub display_name: String,
    pub owner_name: String,
    pub region: Option<String>,
    pub metric_a: Option<i64>,
    pub metric_b: Option<i64>,
}

impl EntryRecord {
    /// Record with the required fields set and the nullable fields empty.
    pub fn new(id: u64, display_name: impl Into<String>, owner_name: impl Into<String>) -> Self {
        EntryRecord {
            id,
            display_name: display_name.into(),
            owner_name: owner_name.into(),
            region: None,
            metric_a: None,
            metric_b: None,
        }
    }
}
