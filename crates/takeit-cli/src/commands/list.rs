use takeit_core::db::{NoteRepository, SqliteNoteRepository};
use takeit_core::{Note, StoreConfig};

use crate::commands::common::{format_note_lines, note_to_list_item, open_database, NoteListItem};
use crate::error::CliError;

pub fn run_list(tag: Option<&str>, as_json: bool, config: &StoreConfig) -> Result<(), CliError> {
    let db = open_database(config)?;
    let repo = SqliteNoteRepository::new(db.connection());
    let notes = match tag.map(str::trim) {
        Some(tag_name) if !tag_name.is_empty() => repo.list_by_tag(tag_name)?,
        _ => repo.list()?,
    };
    print_notes(&notes, as_json)
}

pub fn print_notes(notes: &[Note], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(notes) {
            println!("{line}");
        }
    }

    Ok(())
}
