use takeit_core::db::{NoteRepository, SqliteNoteRepository};
use takeit_core::StoreConfig;

use crate::commands::common::{format_tag_lines, open_database, tag_to_list_item, TagListItem};
use crate::error::CliError;

pub fn run_tag_list(as_json: bool, config: &StoreConfig) -> Result<(), CliError> {
    let db = open_database(config)?;
    let tags = SqliteNoteRepository::new(db.connection()).list_tags()?;

    if as_json {
        let json_items = tags.iter().map(tag_to_list_item).collect::<Vec<TagListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_tag_lines(&tags) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn run_tag_color(name: &str, color: &str, config: &StoreConfig) -> Result<(), CliError> {
    let color = color.trim().to_ascii_uppercase();
    let db = open_database(config)?;
    SqliteNoteRepository::new(db.connection()).set_tag_color(name.trim(), &color)?;

    println!("{} {color}", name.trim());
    Ok(())
}
