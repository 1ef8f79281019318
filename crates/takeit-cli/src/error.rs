use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] takeit_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Invalid note ID: {0}")]
    InvalidNoteId(String),
    #[error("Backup operation failed: {0}")]
    Backup(String),
    #[error("{0}")]
    MergeFailed(String),
}
