//! Point-in-time snapshots of the live store and the operations built on them

mod manager;
mod snapshot;

pub use manager::BackupManager;
pub use snapshot::{is_snapshot_name, SnapshotStore, AUTO_MARKER, SNAPSHOT_EXTENSION, SNAPSHOT_PREFIX};
