use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use takeit_core::BackupManager;

use crate::error::CliError;

/// Stream a backup (by name) or the live store to a file or stdout
pub fn run_export(
    name: Option<&str>,
    live: bool,
    output_path: Option<&Path>,
    manager: &BackupManager,
) -> Result<(), CliError> {
    let snapshot = match name {
        Some(name) if !live => Some(manager.find_backup(name)?),
        _ => None,
    };
    // Check the source before an output file gets created
    let data_path = &manager.config().data_path;
    if snapshot.is_none() && !data_path.is_file() {
        return Err(takeit_core::Error::MissingSource(data_path.clone()).into());
    }

    let written = if let Some(path) = output_path {
        let mut writer = BufWriter::new(File::create(path)?);
        let written = match &snapshot {
            Some(snapshot) => manager.export_snapshot(snapshot, &mut writer)?,
            None => manager.export_live(&mut writer)?,
        };
        println!("{}", path.display());
        written
    } else {
        let mut writer = io::stdout().lock();
        match &snapshot {
            Some(snapshot) => manager.export_snapshot(snapshot, &mut writer)?,
            None => manager.export_live(&mut writer)?,
        }
    };

    tracing::info!("Exported {written} bytes");
    Ok(())
}
