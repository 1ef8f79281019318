//! Snapshot store: the backup directory and the files in it.
//!
//! Snapshot names follow `notes_backup_[autobackup_]yyyyMMdd_HHmmss[_N].db`.
//! Enumeration only recognizes that pattern, so temp files and anything else
//! dropped into the directory are ignored.

use std::fs::{self, File, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use regex::Regex;
use tempfile::NamedTempFile;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::models::{BackupSnapshot, PartialOutcome};

pub const SNAPSHOT_PREFIX: &str = "notes_backup_";
pub const AUTO_MARKER: &str = "autobackup_";
pub const SNAPSHOT_EXTENSION: &str = "db";

/// Upper bound on `_N` suffixes tried for one second's worth of snapshots
const MAX_NAME_ATTEMPTS: u32 = 100;

fn snapshot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^notes_backup_(autobackup_)?\d{8}_\d{6}(_\d+)?\.db$").expect("Invalid regex")
    })
}

/// Whether `file_name` follows the snapshot naming convention
pub fn is_snapshot_name(file_name: &str) -> bool {
    snapshot_pattern().is_match(file_name)
}

/// Name without the collision suffix and extension
fn snapshot_stem(is_auto: bool, at: DateTime<Local>) -> String {
    format!(
        "{SNAPSHOT_PREFIX}{}{}",
        if is_auto { AUTO_MARKER } else { "" },
        at.format("%Y%m%d_%H%M%S")
    )
}

fn millis_since_epoch(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

/// Creation time from metadata, falling back to mtime where the platform
/// does not record birth time
fn created_millis(metadata: &Metadata) -> i64 {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_or(0, millis_since_epoch)
}

/// Manages snapshot files in one backup directory for one live data file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_path: PathBuf,
    backup_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            backup_dir: config.backup_dir.clone(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copy the live data file into a new snapshot.
    ///
    /// The copy is written to a temp file in the backup directory and only
    /// renamed to its snapshot name once complete, so a failed copy never
    /// leaves a visible partial snapshot.
    pub fn create(&self, is_auto: bool) -> Result<BackupSnapshot> {
        if !self.data_path.is_file() {
            return Err(Error::MissingSource(self.data_path.clone()));
        }
        fs::create_dir_all(&self.backup_dir)?;

        let mut temp = NamedTempFile::new_in(&self.backup_dir)?;
        let mut source = File::open(&self.data_path)?;
        io::copy(&mut source, temp.as_file_mut())?;
        temp.as_file().sync_all()?;

        let path = self.publish(temp, &snapshot_stem(is_auto, Local::now()))?;
        let snapshot = Self::snapshot_at(&path)?;
        tracing::info!(
            "Created {} backup {} ({})",
            if is_auto { "automatic" } else { "manual" },
            snapshot.file_name,
            snapshot.formatted_size()
        );
        Ok(snapshot)
    }

    /// Rename a finished temp file to the first free name for `stem`
    fn publish(&self, mut temp: NamedTempFile, stem: &str) -> Result<PathBuf> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                format!("{stem}.{SNAPSHOT_EXTENSION}")
            } else {
                format!("{stem}_{attempt}.{SNAPSHOT_EXTENSION}")
            };
            let target = self.backup_dir.join(file_name);

            match temp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(error) if error.error.kind() == io::ErrorKind::AlreadyExists => {
                    temp = error.file;
                }
                Err(error) => return Err(error.error.into()),
            }
        }

        Err(Error::Backup(format!("No free snapshot name for {stem}")))
    }

    fn snapshot_at(path: &Path) -> Result<BackupSnapshot> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("Invalid snapshot path {}", path.display())))?
            .to_string();
        let metadata = fs::metadata(path)?;

        Ok(BackupSnapshot {
            is_auto: file_name.starts_with(&format!("{SNAPSHOT_PREFIX}{AUTO_MARKER}")),
            file_name,
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            created_at: created_millis(&metadata),
        })
    }

    /// All snapshots, newest first. A missing backup directory is empty.
    ///
    /// Entries that cannot be read are skipped with a warning.
    pub fn list(&self) -> Result<Vec<BackupSnapshot>> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Skipping unreadable backup entry: {err}");
                    continue;
                }
            };
            if !entry.file_name().to_str().is_some_and(is_snapshot_name) {
                continue;
            }

            let path = entry.path();
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable backup: {err}");
                    continue;
                }
            }
            match Self::snapshot_at(&path) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable backup: {err}");
                }
            }
        }

        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        Ok(snapshots)
    }

    /// Look up a snapshot by file name
    pub fn find(&self, file_name: &str) -> Result<BackupSnapshot> {
        if !is_snapshot_name(file_name) {
            return Err(Error::InvalidInput(format!(
                "Not a backup file name: {file_name}"
            )));
        }

        let path = self.backup_dir.join(file_name);
        if !path.is_file() {
            return Err(Error::NotFound(format!("Backup {file_name}")));
        }
        Self::snapshot_at(&path)
    }

    pub fn delete(&self, snapshot: &BackupSnapshot) -> Result<()> {
        fs::remove_file(&snapshot.path)?;
        tracing::info!("Deleted backup {}", snapshot.file_name);
        Ok(())
    }

    /// Delete every snapshot, continuing past individual failures
    pub fn delete_all(&self) -> PartialOutcome {
        let mut outcome = PartialOutcome::default();

        let snapshots = match self.list() {
            Ok(snapshots) => snapshots,
            Err(error) => {
                tracing::error!("Failed to list backups: {error}");
                outcome.record_failure(self.backup_dir.display().to_string(), error);
                return outcome;
            }
        };

        for snapshot in snapshots {
            match fs::remove_file(&snapshot.path) {
                Ok(()) => outcome.record_success(),
                Err(error) => {
                    tracing::warn!("Failed to delete backup {}: {error}", snapshot.file_name);
                    outcome.record_failure(snapshot.file_name, error);
                }
            }
        }

        tracing::info!(
            "Deleted {} of {} backups",
            outcome.succeeded,
            outcome.attempted
        );
        outcome
    }

    /// Sum of file sizes in the backup directory
    pub fn total_size(&self) -> Result<u64> {
        if !self.backup_dir.is_dir() {
            return Ok(0);
        }

        let mut total = 0;
        for entry in fs::read_dir(&self.backup_dir)? {
            let metadata = entry?.metadata()?;
            if metadata.is_file() {
                total += metadata.len();
            }
        }
        Ok(total)
    }

    /// Stream a snapshot's raw bytes
    pub fn export(&self, snapshot: &BackupSnapshot, writer: &mut impl Write) -> Result<u64> {
        copy_file_to(&snapshot.path, writer)
    }

    /// Stream the live data file's raw bytes
    pub fn export_live(&self, writer: &mut impl Write) -> Result<u64> {
        copy_file_to(&self.data_path, writer)
    }
}

fn copy_file_to(path: &Path, writer: &mut impl Write) -> Result<u64> {
    if !path.is_file() {
        return Err(Error::MissingSource(path.to_path_buf()));
    }

    let mut file = File::open(path)?;
    let written = io::copy(&mut file, writer)?;
    writer.flush()?;
    Ok(written)
}
