//! takeit-core - Core library for TakeIt
//!
//! This crate contains the note/tag store, the snapshot store for point-in-time
//! backups, and the schema-tolerant merge engine that reconciles a backup with
//! the live store.

pub mod backup;
pub mod config;
pub mod db;
pub mod error;
pub mod merge;
pub mod models;
pub mod schema;
pub mod util;

pub use backup::{BackupManager, SnapshotStore};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use merge::{resolve, MergeEngine};
pub use models::{
    BackupSnapshot, ConflictStrategy, Decision, MergeResult, Note, NoteId, PartialOutcome, Tag,
    TagId,
};
pub use schema::SchemaDescriptor;
