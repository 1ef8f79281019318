use takeit_core::db::{NoteRepository, SqliteNoteRepository};
use takeit_core::StoreConfig;

use crate::commands::common::{open_database, parse_note_id};
use crate::error::CliError;

pub fn run_delete(id: &str, config: &StoreConfig) -> Result<(), CliError> {
    let id = parse_note_id(id)?;
    let db = open_database(config)?;
    SqliteNoteRepository::new(db.connection()).soft_delete(id)?;

    println!("{id}");
    Ok(())
}
