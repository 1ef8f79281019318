//! Data models for TakeIt

mod merge;
mod note;
mod snapshot;
mod tag;

pub use merge::{ConflictStrategy, Decision, MergeResult, PartialOutcome, StepFailure};
pub use note::{parse_properties, serialize_properties, Note, NoteId};
pub use snapshot::BackupSnapshot;
pub use tag::{color_for_name, text_color, Tag, TagId, DEFAULT_TAG_COLOR, PRESET_COLORS};
