//! Conflict resolution policy

use crate::models::{ConflictStrategy, Decision};

/// Decide which side of a conflict wins.
///
/// Under [`ConflictStrategy::KeepNewer`] the incoming row wins only when it is
/// strictly newer. A missing timestamp on either side falls back to taking the
/// incoming row, the same as [`ConflictStrategy::KeepBackup`].
pub const fn resolve(
    existing_modified: Option<i64>,
    incoming_modified: Option<i64>,
    strategy: ConflictStrategy,
) -> Decision {
    match strategy {
        ConflictStrategy::KeepCurrent => Decision::KeepExisting,
        ConflictStrategy::KeepBackup => Decision::TakeIncoming,
        ConflictStrategy::KeepNewer => match (existing_modified, incoming_modified) {
            (Some(existing), Some(incoming)) if incoming <= existing => Decision::KeepExisting,
            _ => Decision::TakeIncoming,
        },
    }
}
