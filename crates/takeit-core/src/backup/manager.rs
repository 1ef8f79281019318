//! Backup orchestration: safety backups around restore, merge and upgrade.
//!
//! Entry points meant for direct display return terminal outcomes (`bool`,
//! [`MergeResult`], [`PartialOutcome`]) and log the cause of any failure.
//! None of these operations are atomic as a whole: a crash mid-restore or
//! mid-merge can leave the live store partially updated.

use std::fs;
use std::io::Write;

use super::SnapshotStore;
use crate::config::StoreConfig;
use crate::db::{Database, NoteRepository, SqliteNoteRepository};
use crate::error::{Error, Result};
use crate::merge::MergeEngine;
use crate::models::{BackupSnapshot, ConflictStrategy, MergeResult, PartialOutcome};
use crate::util::{retention_cutoff, unix_millis_now};

/// Label recorded in a [`PartialOutcome`] for the pre-restore safety backup
const SAFETY_BACKUP_STEP: &str = "safety backup";

pub struct BackupManager {
    config: StoreConfig,
    snapshots: SnapshotStore,
}

impl BackupManager {
    pub fn new(config: StoreConfig) -> Self {
        let snapshots = SnapshotStore::new(&config);
        Self { config, snapshots }
    }

    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub const fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn create_backup(&self, is_auto: bool) -> bool {
        match self.snapshots.create(is_auto) {
            Ok(_) => true,
            Err(error) => {
                tracing::error!("Failed to create backup: {error}");
                false
            }
        }
    }

    /// Snapshots newest first; empty when the directory cannot be read
    pub fn list_backups(&self) -> Vec<BackupSnapshot> {
        self.snapshots.list().unwrap_or_else(|error| {
            tracing::error!("Failed to list backups: {error}");
            Vec::new()
        })
    }

    pub fn find_backup(&self, file_name: &str) -> Result<BackupSnapshot> {
        self.snapshots.find(file_name)
    }

    pub fn delete_backup(&self, snapshot: &BackupSnapshot) -> bool {
        match self.snapshots.delete(snapshot) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!("Failed to delete backup {}: {error}", snapshot.file_name);
                false
            }
        }
    }

    pub fn delete_all_backups(&self) -> PartialOutcome {
        self.snapshots.delete_all()
    }

    pub fn total_backup_size(&self) -> u64 {
        self.snapshots.total_size().unwrap_or_else(|error| {
            tracing::error!("Failed to compute backup size: {error}");
            0
        })
    }

    /// Overwrite the live data file with a snapshot's bytes.
    ///
    /// A safety backup of the live file is attempted first; if it fails the
    /// restore still proceeds and the failure is recorded in the outcome.
    /// A missing snapshot fails before anything is touched.
    pub fn restore_detailed(&self, snapshot: &BackupSnapshot) -> Result<PartialOutcome> {
        if !snapshot.path.is_file() {
            return Err(Error::MissingSource(snapshot.path.clone()));
        }

        let mut outcome = PartialOutcome::default();
        match self.snapshots.create(true) {
            Ok(_) => outcome.record_success(),
            Err(error) => {
                tracing::warn!("Safety backup before restore failed, continuing: {error}");
                outcome.record_failure(SAFETY_BACKUP_STEP, error);
            }
        }

        if let Some(parent) = self.config.data_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&snapshot.path, &self.config.data_path).map_err(|error| {
            Error::Backup(format!("Failed to restore {}: {error}", snapshot.file_name))
        })?;
        outcome.record_success();

        tracing::info!("Restored live store from {}", snapshot.file_name);
        Ok(outcome)
    }

    /// Restore from a snapshot; callers should restart anything holding the
    /// live store open.
    pub fn restore(&self, snapshot: &BackupSnapshot) -> bool {
        match self.restore_detailed(snapshot) {
            Ok(_) => true,
            Err(error) => {
                tracing::error!("Failed to restore backup: {error}");
                false
            }
        }
    }

    /// Merge a snapshot into the live store.
    ///
    /// Both stores must exist. A safety backup is taken before the live store
    /// is touched; its failure is logged and the merge continues.
    pub fn merge(&self, snapshot: &BackupSnapshot, strategy: ConflictStrategy) -> MergeResult {
        let (backup, live) = match self.open_for_merge(snapshot) {
            Ok(stores) => stores,
            Err(error) => {
                tracing::error!("Failed to open stores for merge: {error}");
                return MergeResult::failed(format!("Merge failed: {error}"));
            }
        };

        if let Err(error) = self.snapshots.create(true) {
            tracing::warn!("Safety backup before merge failed, continuing: {error}");
        }

        tracing::info!(
            "Merging {} into live store with strategy {strategy}",
            snapshot.file_name
        );
        let result = MergeEngine::new(backup.connection(), live.connection(), strategy).run();

        for (label, store) in [("backup", backup), ("live", live)] {
            if let Err(error) = store.close() {
                tracing::warn!("Failed to close {label} store after merge: {error}");
            }
        }

        result
    }

    fn open_for_merge(&self, snapshot: &BackupSnapshot) -> Result<(Database, Database)> {
        let backup = Database::open_read_only(&snapshot.path)?;
        let live = Database::open_existing(&self.config.data_path)?;
        Ok((backup, live))
    }

    /// Permanently remove soft-deleted notes last modified more than
    /// `retention_days` ago. Returns the number of notes removed.
    pub fn auto_clean_deleted(&self, retention_days: u32) -> Result<usize> {
        let live = self.open_live()?;
        let cutoff = retention_cutoff(unix_millis_now(), retention_days);
        let removed = SqliteNoteRepository::new(live.connection()).purge_deleted_before(cutoff)?;
        live.close()?;

        if removed > 0 {
            tracing::info!("Auto-cleaned {removed} notes older than {retention_days} days");
        }
        Ok(removed)
    }

    /// Stream a snapshot's raw bytes to a caller-chosen destination
    pub fn export_snapshot(&self, snapshot: &BackupSnapshot, writer: &mut impl Write) -> Result<u64> {
        self.snapshots.export(snapshot, writer)
    }

    /// Stream the live data file's raw bytes to a caller-chosen destination
    pub fn export_live(&self, writer: &mut impl Write) -> Result<u64> {
        self.snapshots.export_live(writer)
    }

    /// Bring the live store to the current schema version, after a safety
    /// backup. Returns the resulting version.
    pub fn upgrade_live_store(&self) -> Result<i32> {
        if !self.config.data_path.is_file() {
            return Err(Error::MissingSource(self.config.data_path.clone()));
        }
        self.snapshots.create(true)?;

        let live = Database::open(&self.config.data_path)?;
        let version = live.schema_version()?;
        live.close()?;

        tracing::info!("Live store is at schema version {version}");
        Ok(version)
    }

    /// Open the existing live store with migrations applied
    fn open_live(&self) -> Result<Database> {
        if !self.config.data_path.is_file() {
            return Err(Error::MissingSource(self.config.data_path.clone()));
        }
        Database::open(&self.config.data_path)
    }
}
