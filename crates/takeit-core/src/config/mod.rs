//! Store configuration.
//!
//! Paths to the live data file and the backup directory are passed explicitly
//! to the snapshot store and the backup manager instead of being looked up
//! from ambient state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the live data file inside a data directory
pub const DATA_FILE_NAME: &str = "notes.db";
/// Name of the backup directory inside a data directory
pub const BACKUP_DIR_NAME: &str = "database_backups";
/// File name of the optional JSON config inside a data directory
pub const CONFIG_FILE_NAME: &str = "takeit.json";
/// Days a soft-deleted note stays in the recycle bin before auto-clean
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Locations and policies for one live store and its backups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Live data file
    pub data_path: PathBuf,
    /// Directory holding snapshot files
    pub backup_dir: PathBuf,
    /// Recycle bin retention window
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

const fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

/// On-disk form of the config; every field is optional and relative paths are
/// resolved against the data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct StoreConfigFile {
    #[serde(default)]
    data_path: Option<PathBuf>,
    #[serde(default)]
    backup_dir: Option<PathBuf>,
    #[serde(default)]
    retention_days: Option<u32>,
}

impl StoreConfig {
    /// Create a config with explicit paths and the default retention window
    pub fn new(data_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            backup_dir: backup_dir.into(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    /// Standard layout inside a data directory
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self::new(data_dir.join(DATA_FILE_NAME), data_dir.join(BACKUP_DIR_NAME))
    }

    /// Load `takeit.json` from a data directory, falling back to the standard
    /// layout when the file does not exist.
    pub fn load_from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        Self::load_from_path(data_dir, &data_dir.join(CONFIG_FILE_NAME))
    }

    /// Load a config file, resolving relative paths against `data_dir`.
    pub fn load_from_path(data_dir: &Path, path: &Path) -> Result<Self> {
        let defaults = Self::from_data_dir(data_dir);
        if !path.exists() {
            return Ok(defaults);
        }

        let raw = std::fs::read_to_string(path)?;
        let file: StoreConfigFile = serde_json::from_str(&raw).map_err(|error| {
            Error::InvalidInput(format!(
                "Failed to parse config at {}: {error}",
                path.display()
            ))
        })?;

        let resolve = |value: PathBuf| {
            if value.is_absolute() {
                value
            } else {
                data_dir.join(value)
            }
        };

        Ok(Self {
            data_path: file.data_path.map_or(defaults.data_path, resolve),
            backup_dir: file.backup_dir.map_or(defaults.backup_dir, resolve),
            retention_days: file.retention_days.unwrap_or(defaults.retention_days),
        })
    }
}
