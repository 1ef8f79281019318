use takeit_core::BackupManager;

use crate::error::CliError;

pub fn run_upgrade(manager: &BackupManager) -> Result<(), CliError> {
    let version = manager.upgrade_live_store()?;

    println!("Live store is at schema version {version}");
    Ok(())
}
