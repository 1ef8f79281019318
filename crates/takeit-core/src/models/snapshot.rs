//! Backup snapshot model

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::{format_local_millis, format_size};

/// A point-in-time copy of the live data file inside the backup directory.
///
/// Never mutated in place: snapshots are created whole and destroyed whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    /// File name inside the backup directory
    pub file_name: String,
    /// Absolute path of the snapshot file
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Creation time (Unix ms), taken from file metadata
    pub created_at: i64,
    /// Whether this is a safety backup taken automatically before a mutation
    pub is_auto: bool,
}

impl BackupSnapshot {
    #[must_use]
    pub fn formatted_size(&self) -> String {
        format_size(self.size_bytes)
    }

    #[must_use]
    pub fn formatted_date(&self) -> String {
        format_local_millis(self.created_at)
    }
}
