//! Note and tag repository implementation

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{color_for_name, parse_properties, serialize_properties, Note, NoteId, Tag, TagId};

const NOTE_COLUMNS: &str = "id, content, created_time, modified_time, custom_properties, deleted";

/// Trait for note and tag storage operations
pub trait NoteRepository {
    /// Insert or replace a note together with its tag links
    fn save(&self, note: &Note) -> Result<()>;

    /// Get a note by ID, deleted or not
    fn get(&self, id: NoteId) -> Result<Option<Note>>;

    /// List live notes, most recently modified first
    fn list(&self) -> Result<Vec<Note>>;

    /// List live notes carrying the named tag, most recently modified first
    fn list_by_tag(&self, tag: &str) -> Result<Vec<Note>>;

    /// List notes in the recycle bin, most recently deleted first
    fn list_deleted(&self) -> Result<Vec<Note>>;

    /// Move a note to the recycle bin
    fn soft_delete(&self, id: NoteId) -> Result<()>;

    /// Bring a note back from the recycle bin
    fn restore(&self, id: NoteId) -> Result<()>;

    /// Remove notes and their tag links for good
    fn permanent_delete(&self, ids: &[NoteId]) -> Result<usize>;

    /// Permanently remove recycled notes last modified before `cutoff_ms`
    fn purge_deleted_before(&self, cutoff_ms: i64) -> Result<usize>;

    /// All tags, by name
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Change the color of a tag
    fn set_tag_color(&self, name: &str, color: &str) -> Result<()>;

    /// Tag names attached to a note
    fn tags_for_note(&self, id: NoteId) -> Result<Vec<String>>;

    /// Allocate an id for a new note
    fn next_note_id(&self) -> Result<NoteId>;
}

/// `SQLite` implementation of `NoteRepository`
pub struct SqliteNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteNoteRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Replace the tag links of a note, creating missing tags
    fn sync_tags(&self, note_id: NoteId, tags: &[String]) -> Result<()> {
        self.conn.execute(
            "DELETE FROM note_tags WHERE note_id = ?",
            params![note_id.get()],
        )?;

        for tag_name in tags {
            let tag_id = self.get_or_create_tag(tag_name)?;
            self.conn.execute(
                "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?, ?)",
                params![note_id.get(), tag_id.0],
            )?;
        }

        Ok(())
    }

    /// Get or create a tag by exact name
    fn get_or_create_tag(&self, name: &str) -> Result<TagId> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT tag_id FROM tags WHERE tag_name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(TagId(id));
        }

        self.conn.execute(
            "INSERT INTO tags (tag_name, tag_color) VALUES (?, ?)",
            params![name, color_for_name(name)],
        )?;
        Ok(TagId(self.conn.last_insert_rowid()))
    }

    fn query_notes(&self, deleted: bool) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE deleted = ? ORDER BY modified_time DESC, id DESC"
        ))?;

        let notes = stmt
            .query_map(params![i32::from(deleted)], Self::parse_note)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.with_tags(notes)
    }

    fn with_tags(&self, mut notes: Vec<Note>) -> Result<Vec<Note>> {
        for note in &mut notes {
            note.tags = self.tags_for_note(note.id)?;
        }
        Ok(notes)
    }

    /// Parse a note from a database row (tags are loaded separately)
    fn parse_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
        let properties: Option<String> = row.get(4)?;
        Ok(Note {
            id: NoteId(row.get(0)?),
            content: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            created_time: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
            modified_time: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
            tags: Vec::new(),
            custom_properties: parse_properties(properties.as_deref()),
            deleted: row.get::<_, Option<i64>>(5)?.unwrap_or_default() != 0,
        })
    }

    fn set_deleted(&self, id: NoteId, deleted: bool) -> Result<()> {
        let now = crate::util::unix_millis_now();
        let rows = self.conn.execute(
            "UPDATE notes SET deleted = ?, modified_time = ? WHERE id = ? AND deleted = ?",
            params![i32::from(deleted), now, id.get(), i32::from(!deleted)],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn save(&self, note: &Note) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        self.conn.execute(
            "INSERT INTO notes (id, content, timestamp, created_time, modified_time, custom_properties, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                timestamp = excluded.timestamp,
                created_time = excluded.created_time,
                modified_time = excluded.modified_time,
                custom_properties = excluded.custom_properties,
                deleted = excluded.deleted",
            params![
                note.id.get(),
                note.content,
                note.created_time,
                note.created_time,
                note.modified_time,
                serialize_properties(&note.custom_properties),
                i32::from(note.deleted)
            ],
        )?;
        self.sync_tags(note.id, &note.tags)?;

        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: NoteId) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
                params![id.get()],
                Self::parse_note,
            )
            .optional()?;

        match note {
            Some(mut note) => {
                note.tags = self.tags_for_note(note.id)?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Note>> {
        self.query_notes(false)
    }

    fn list_by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.id, n.content, n.created_time, n.modified_time, n.custom_properties, n.deleted
             FROM notes n
             INNER JOIN note_tags nt ON n.id = nt.note_id
             INNER JOIN tags t ON t.tag_id = nt.tag_id
             WHERE t.tag_name = ? AND n.deleted = 0
             ORDER BY n.modified_time DESC, n.id DESC",
        )?;

        let notes = stmt
            .query_map(params![tag], Self::parse_note)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.with_tags(notes)
    }

    fn list_deleted(&self) -> Result<Vec<Note>> {
        self.query_notes(true)
    }

    fn soft_delete(&self, id: NoteId) -> Result<()> {
        self.set_deleted(id, true)
    }

    fn restore(&self, id: NoteId) -> Result<()> {
        self.set_deleted(id, false)
    }

    fn permanent_delete(&self, ids: &[NoteId]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;

        for id in ids {
            self.conn
                .execute("DELETE FROM note_tags WHERE note_id = ?", params![id.get()])?;
            removed += self
                .conn
                .execute("DELETE FROM notes WHERE id = ?", params![id.get()])?;
        }

        tx.commit()?;
        Ok(removed)
    }

    fn purge_deleted_before(&self, cutoff_ms: i64) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM notes WHERE deleted = 1 AND modified_time < ?")?;
        let ids = stmt
            .query_map(params![cutoff_ms], |row| row.get(0).map(NoteId))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if ids.is_empty() {
            return Ok(0);
        }
        self.permanent_delete(&ids)
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag_id, tag_name, tag_color FROM tags ORDER BY tag_name")?;

        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: TagId(row.get(0)?),
                    name: row.get(1)?,
                    color: row
                        .get::<_, Option<String>>(2)?
                        .unwrap_or_else(|| crate::models::DEFAULT_TAG_COLOR.to_string()),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tags)
    }

    fn set_tag_color(&self, name: &str, color: &str) -> Result<()> {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(Error::InvalidInput(format!("Invalid tag color: {color}")));
        }

        let rows = self.conn.execute(
            "UPDATE tags SET tag_color = ? WHERE tag_name = ?",
            params![color, name],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn tags_for_note(&self, id: NoteId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.tag_name FROM tags t
             INNER JOIN note_tags nt ON t.tag_id = nt.tag_id
             WHERE nt.note_id = ?
             ORDER BY t.tag_name",
        )?;

        let tags = stmt
            .query_map(params![id.get()], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn next_note_id(&self) -> Result<NoteId> {
        let max_id: Option<i64> =
            self.conn
                .query_row("SELECT MAX(id) FROM notes", [], |row| row.get(0))?;
        let now = crate::util::unix_millis_now();
        Ok(NoteId(max_id.map_or(now, |max| now.max(max.saturating_add(1)))))
    }
}
