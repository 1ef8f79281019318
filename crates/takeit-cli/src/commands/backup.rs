use takeit_core::BackupManager;

use crate::commands::common::{backup_to_list_item, format_backup_lines, BackupListItem};
use crate::error::CliError;

pub fn run_backup_create(is_auto: bool, manager: &BackupManager) -> Result<(), CliError> {
    let snapshot = manager.snapshots().create(is_auto)?;

    println!("{}", snapshot.path.display());
    Ok(())
}

pub fn run_backup_list(as_json: bool, manager: &BackupManager) -> Result<(), CliError> {
    let snapshots = manager.snapshots().list()?;

    if as_json {
        let json_items = snapshots
            .iter()
            .map(backup_to_list_item)
            .collect::<Vec<BackupListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No backups in {}", manager.config().backup_dir.display());
        return Ok(());
    }

    for line in format_backup_lines(&snapshots) {
        println!("{line}");
    }
    println!(
        "{} backups, {} total",
        snapshots.len(),
        takeit_core::util::format_size(manager.total_backup_size())
    );
    Ok(())
}

pub fn run_backup_delete(name: &str, manager: &BackupManager) -> Result<(), CliError> {
    let snapshot = manager.find_backup(name)?;
    if !manager.delete_backup(&snapshot) {
        return Err(CliError::Backup(format!("Could not delete {name}")));
    }

    println!("{name}");
    Ok(())
}

pub fn run_backup_clear(manager: &BackupManager) -> Result<(), CliError> {
    let outcome = manager.delete_all_backups();

    for failure in &outcome.failures {
        eprintln!("Failed to delete {}: {}", failure.target, failure.reason);
    }
    println!("Deleted {} of {} backups", outcome.succeeded, outcome.attempted);

    if outcome.is_complete() {
        Ok(())
    } else {
        Err(CliError::Backup(format!(
            "{} backups could not be deleted",
            outcome.failures.len()
        )))
    }
}
