use takeit_core::db::{NoteRepository, SqliteNoteRepository};
use takeit_core::{Note, StoreConfig};

use crate::commands::common::{normalize_content, open_database};
use crate::error::CliError;

pub fn run_add(
    content_parts: &[String],
    tags: &[String],
    config: &StoreConfig,
) -> Result<(), CliError> {
    let content = normalize_content(&content_parts.join(" ")).ok_or(CliError::EmptyContent)?;
    let tags = tags
        .iter()
        .filter_map(|tag| normalize_content(tag))
        .collect::<Vec<_>>();

    let db = open_database(config)?;
    let repo = SqliteNoteRepository::new(db.connection());
    let note = Note::new(repo.next_note_id()?, content).with_tags(tags);
    repo.save(&note)?;

    println!("{}", note.id);
    Ok(())
}
