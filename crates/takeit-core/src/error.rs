//! Error types for takeit-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using takeit-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in takeit-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// `SQLite` error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A data file or backup file that an operation reads from is absent
    #[error("Source file does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Snapshot creation or publication failed
    #[error("Backup error: {0}")]
    Backup(String),
}
