use takeit_core::db::{NoteRepository, SqliteNoteRepository};
use takeit_core::{BackupManager, StoreConfig};

use crate::commands::common::{open_database, parse_note_id};
use crate::commands::list::print_notes;
use crate::error::CliError;

pub fn run_trash_list(as_json: bool, config: &StoreConfig) -> Result<(), CliError> {
    let db = open_database(config)?;
    let notes = SqliteNoteRepository::new(db.connection()).list_deleted()?;
    print_notes(&notes, as_json)
}

pub fn run_trash_restore(id: &str, config: &StoreConfig) -> Result<(), CliError> {
    let id = parse_note_id(id)?;
    let db = open_database(config)?;
    SqliteNoteRepository::new(db.connection()).restore(id)?;

    println!("{id}");
    Ok(())
}

pub fn run_trash_purge(
    retention_days: Option<u32>,
    manager: &BackupManager,
) -> Result<(), CliError> {
    let retention_days = retention_days.unwrap_or(manager.config().retention_days);
    let removed = manager.auto_clean_deleted(retention_days)?;

    println!("Removed {removed} notes deleted more than {retention_days} days ago");
    Ok(())
}
