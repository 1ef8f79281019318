use takeit_core::BackupManager;

use crate::error::CliError;

pub fn run_restore(name: &str, manager: &BackupManager) -> Result<(), CliError> {
    let snapshot = manager.find_backup(name)?;
    let outcome = manager.restore_detailed(&snapshot)?;

    for failure in &outcome.failures {
        eprintln!("Warning: {} failed: {}", failure.target, failure.reason);
    }
    println!("Restored {name}");
    println!("Restart any running TakeIt instance to pick up the restored data.");
    Ok(())
}
