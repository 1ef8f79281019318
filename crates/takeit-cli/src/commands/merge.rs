use takeit_core::{BackupManager, ConflictStrategy};

use crate::error::CliError;

pub fn run_merge(
    name: &str,
    strategy: ConflictStrategy,
    manager: &BackupManager,
) -> Result<(), CliError> {
    let snapshot = manager.find_backup(name)?;
    let result = manager.merge(&snapshot, strategy);

    if !result.success {
        return Err(CliError::MergeFailed(result.message));
    }

    println!("{}", result.message);
    Ok(())
}
