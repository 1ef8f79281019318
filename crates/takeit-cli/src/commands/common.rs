use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use takeit_core::db::Database;
use takeit_core::models::text_color;
use takeit_core::{BackupSnapshot, Note, NoteId, StoreConfig, Tag};

use crate::error::CliError;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TAKEIT_DATA_DIR";

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub preview: String,
    pub content: String,
    pub created_time: i64,
    pub modified_time: i64,
    pub relative_time: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BackupListItem {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size: String,
    pub created_at: i64,
    pub date: String,
    pub is_auto: bool,
}

#[derive(Debug, Serialize)]
pub struct TagListItem {
    pub name: String,
    pub color: String,
    pub text_color: &'static str,
}

pub fn resolve_data_dir(cli_data_dir: Option<PathBuf>) -> PathBuf {
    cli_data_dir
        .or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(default_data_dir)
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("takeit")
}

pub fn load_store_config(data_dir: &Path) -> Result<StoreConfig, CliError> {
    Ok(StoreConfig::load_from_data_dir(data_dir)?)
}

/// Open the live store, creating it (and its directory) on first use
pub fn open_database(config: &StoreConfig) -> Result<Database, CliError> {
    if let Some(parent) = config.data_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Database::open(&config.data_path)?)
}

pub fn parse_note_id(id: &str) -> Result<NoteId, CliError> {
    id.parse()
        .map_err(|_| CliError::InvalidNoteId(id.trim().to_string()))
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let preview = note.title_preview(40);
            let relative_time = format_relative_time(note.modified_time, now_ms);
            let tags = render_tags(note);

            if tags.is_empty() {
                format!("{:<13}  {preview:<40}  {relative_time}", note.id.get())
            } else {
                format!("{:<13}  {preview:<40}  {relative_time:<10}  {tags}", note.id.get())
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    let mut tags = note.tags.clone();
    tags.sort();

    NoteListItem {
        id: note.id.get(),
        preview: note.title_preview(80),
        content: note.content.clone(),
        created_time: note.created_time,
        modified_time: note.modified_time,
        relative_time: format_relative_time(note.modified_time, now_ms),
        tags,
    }
}

pub fn render_tags(note: &Note) -> String {
    let mut tags = note.tags.clone();
    tags.sort();
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn backup_to_list_item(snapshot: &BackupSnapshot) -> BackupListItem {
    BackupListItem {
        name: snapshot.file_name.clone(),
        path: snapshot.path.clone(),
        size_bytes: snapshot.size_bytes,
        size: snapshot.formatted_size(),
        created_at: snapshot.created_at,
        date: snapshot.formatted_date(),
        is_auto: snapshot.is_auto,
    }
}

pub fn format_backup_lines(snapshots: &[BackupSnapshot]) -> Vec<String> {
    snapshots
        .iter()
        .map(|snapshot| {
            let kind = if snapshot.is_auto { "auto" } else { "manual" };
            format!(
                "{:<48}  {:<6}  {:>10}  {}",
                snapshot.file_name,
                kind,
                snapshot.formatted_size(),
                snapshot.formatted_date()
            )
        })
        .collect()
}

pub fn tag_to_list_item(tag: &Tag) -> TagListItem {
    TagListItem {
        name: tag.name.clone(),
        color: tag.color.clone(),
        text_color: text_color(&tag.color),
    }
}

/// One line per tag: name, background color and the readable text color on it
pub fn format_tag_lines(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .map(|tag| {
            format!(
                "{:<24}  {}  text {}",
                tag.name,
                tag.color,
                text_color(&tag.color)
            )
        })
        .collect()
}
