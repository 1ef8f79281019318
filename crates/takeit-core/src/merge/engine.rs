//! Table-by-table merge of a backup store into the live store.
//!
//! Tables are merged in a fixed order (`tags`, `notes`, `note_tags`) and only when
//! present on both sides. Columns are looked up by name on every row, so a
//! backup written by any earlier schema version merges with typed defaults,
//! and writes only touch columns the live schema actually has.

use std::collections::BTreeMap;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};

use super::resolve;
use crate::error::Result;
use crate::models::{
    parse_properties, serialize_properties, ConflictStrategy, Decision, MergeResult,
    DEFAULT_TAG_COLOR,
};
use crate::schema::{
    quote_identifier, RowView, SchemaDescriptor, NOTES_TABLE, NOTE_TAGS_TABLE, TAGS_TABLE,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct MergeTally {
    notes: usize,
    tags: usize,
    associations: usize,
    skipped_associations: usize,
    conflicts: usize,
}

/// A note row read defensively from either side of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
struct NoteRow {
    id: i64,
    content: String,
    created_time: Option<i64>,
    modified_time: Option<i64>,
    custom_properties: BTreeMap<String, String>,
    deleted: bool,
}

impl NoteRow {
    /// `None` only when the row has no usable id.
    ///
    /// Schemas older than split timestamps only carry `timestamp`, which then
    /// stands in for both times.
    fn from_view(row: &RowView) -> Option<Self> {
        Some(Self {
            id: row.i64("id")?,
            content: row.text("content").unwrap_or_default(),
            created_time: row.first_i64(&["created_time", "timestamp", "modified_time"]),
            modified_time: row.first_i64(&["modified_time", "timestamp", "created_time"]),
            custom_properties: parse_properties(row.text("custom_properties").as_deref()),
            deleted: row.flag("deleted").unwrap_or(false),
        })
    }

    /// Every known note column with defaults filled in
    fn values(&self) -> [(&'static str, Value); 7] {
        let created = self.created_time.unwrap_or_default();
        [
            ("id", Value::Integer(self.id)),
            ("content", Value::Text(self.content.clone())),
            ("timestamp", Value::Integer(created)),
            ("created_time", Value::Integer(created)),
            (
                "modified_time",
                Value::Integer(self.modified_time.unwrap_or(created)),
            ),
            (
                "custom_properties",
                Value::Text(serialize_properties(&self.custom_properties)),
            ),
            ("deleted", Value::Integer(i64::from(self.deleted))),
        ]
    }
}

/// Merges one backup store into one live store under a conflict strategy
pub struct MergeEngine<'a> {
    backup: &'a Connection,
    live: &'a Connection,
    strategy: ConflictStrategy,
}

impl<'a> MergeEngine<'a> {
    pub const fn new(
        backup: &'a Connection,
        live: &'a Connection,
        strategy: ConflictStrategy,
    ) -> Self {
        Self {
            backup,
            live,
            strategy,
        }
    }

    /// Run the merge to a terminal outcome.
    ///
    /// Errors never escape: they become a failed [`MergeResult`] carrying the
    /// cause. Tables merged before the error stay merged.
    pub fn run(&self) -> MergeResult {
        match self.try_run() {
            Ok(tally) => {
                tracing::info!(
                    notes = tally.notes,
                    tags = tally.tags,
                    associations = tally.associations,
                    skipped_associations = tally.skipped_associations,
                    conflicts = tally.conflicts,
                    strategy = %self.strategy,
                    "Merge completed"
                );
                MergeResult::completed(tally.notes, tally.tags, tally.associations, tally.conflicts)
            }
            Err(error) => {
                tracing::error!("Error during database merge: {error}");
                MergeResult::failed(format!("Merge failed: {error}"))
            }
        }
    }

    fn try_run(&self) -> Result<MergeTally> {
        let backup_schema = SchemaDescriptor::describe(self.backup)?;
        let live_schema = SchemaDescriptor::describe(self.live)?;
        tracing::debug!(
            backup_tables = ?backup_schema.table_names().collect::<Vec<_>>(),
            live_tables = ?live_schema.table_names().collect::<Vec<_>>(),
            "Described both schemas"
        );
        let on_both_sides = |table: &str| {
            let present = backup_schema.has_table(table) && live_schema.has_table(table);
            if !present {
                tracing::debug!("Skipping table {table}: not present in both stores");
            }
            present
        };

        let mut tally = MergeTally::default();
        if on_both_sides(TAGS_TABLE) {
            self.merge_tags(&backup_schema, &live_schema, &mut tally)?;
        }
        if on_both_sides(NOTES_TABLE) {
            self.merge_notes(&backup_schema, &live_schema, &mut tally)?;
        }
        if on_both_sides(NOTE_TAGS_TABLE) {
            self.merge_note_tags(&backup_schema, &mut tally)?;
        }

        Ok(tally)
    }

    /// Tags are matched by name. Only the color can conflict.
    fn merge_tags(
        &self,
        backup_schema: &SchemaDescriptor,
        live_schema: &SchemaDescriptor,
        tally: &mut MergeTally,
    ) -> Result<()> {
        let live_has_color = live_schema.has_column(TAGS_TABLE, "tag_color");
        let lookup = if live_has_color {
            "SELECT tag_color FROM tags WHERE tag_name = ?1"
        } else {
            "SELECT NULL FROM tags WHERE tag_name = ?1"
        };

        for row in backup_schema.read_rows(self.backup, TAGS_TABLE)? {
            let Some(name) = row.text("tag_name") else {
                tracing::warn!("Skipping backup tag without a name");
                continue;
            };
            let color = row
                .text("tag_color")
                .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());

            let existing: Option<Option<String>> = self
                .live
                .query_row(lookup, [&name], |row| row.get(0))
                .optional()?;

            match existing {
                None => {
                    if live_has_color {
                        self.live.execute(
                            "INSERT INTO tags (tag_name, tag_color) VALUES (?1, ?2)",
                            params![name, color],
                        )?;
                    } else {
                        self.live
                            .execute("INSERT INTO tags (tag_name) VALUES (?1)", [&name])?;
                    }
                    tally.tags += 1;
                }
                Some(_) if !live_has_color => {}
                Some(existing_color) => {
                    let existing_color =
                        existing_color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());
                    if existing_color == color {
                        continue;
                    }

                    tally.conflicts += 1;
                    // Tags carry no modification time
                    if resolve(None, None, self.strategy) == Decision::TakeIncoming {
                        self.live.execute(
                            "UPDATE tags SET tag_color = ?1 WHERE tag_name = ?2",
                            params![color, name],
                        )?;
                        tally.tags += 1;
                    }
                }
            }
        }

        Ok(())
    }

    /// Notes are matched by id; `modified_time` decides under `KeepNewer`.
    ///
    /// Unlike tags, a note found on both sides always goes through the
    /// resolver.
    fn merge_notes(
        &self,
        backup_schema: &SchemaDescriptor,
        live_schema: &SchemaDescriptor,
        tally: &mut MergeTally,
    ) -> Result<()> {
        for row in backup_schema.read_rows(self.backup, NOTES_TABLE)? {
            let Some(incoming) = NoteRow::from_view(&row) else {
                tracing::warn!("Skipping backup note without an id");
                continue;
            };

            let existing = live_schema
                .find_row(self.live, NOTES_TABLE, "id", incoming.id)?
                .and_then(|row| NoteRow::from_view(&row));

            let Some(existing) = existing else {
                self.insert_note(live_schema, &incoming)?;
                tally.notes += 1;
                continue;
            };

            // Any id present on both sides is a conflict, even an identical row
            tally.conflicts += 1;
            match resolve(existing.modified_time, incoming.modified_time, self.strategy) {
                Decision::TakeIncoming => {
                    self.update_note(live_schema, &incoming)?;
                    tally.notes += 1;
                }
                Decision::KeepExisting => {
                    tracing::debug!(note_id = incoming.id, "Keeping live note");
                }
            }
        }

        Ok(())
    }

    fn insert_note(&self, live_schema: &SchemaDescriptor, note: &NoteRow) -> Result<()> {
        let (columns, values): (Vec<_>, Vec<_>) = note
            .values()
            .into_iter()
            .filter(|(column, _)| live_schema.has_column(NOTES_TABLE, column))
            .unzip();

        let column_list = columns
            .iter()
            .map(|column| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");

        self.live.execute(
            &format!("INSERT INTO notes ({column_list}) VALUES ({placeholders})"),
            params_from_iter(values),
        )?;
        Ok(())
    }

    fn update_note(&self, live_schema: &SchemaDescriptor, note: &NoteRow) -> Result<()> {
        let (columns, mut values): (Vec<_>, Vec<_>) = note
            .values()
            .into_iter()
            .filter(|(column, _)| *column != "id" && live_schema.has_column(NOTES_TABLE, column))
            .unzip();

        let assignments = columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{} = ?{}", quote_identifier(column), index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        values.push(Value::Integer(note.id));

        self.live.execute(
            &format!(
                "UPDATE notes SET {assignments} WHERE id = ?{}",
                values.len()
            ),
            params_from_iter(values),
        )?;
        Ok(())
    }

    /// Associations are a set: insert-if-absent from the backup's own id pairs.
    ///
    /// Pairs the live store rejects (e.g. a foreign key to a missing note) are
    /// skipped rather than failing the merge.
    fn merge_note_tags(&self, backup_schema: &SchemaDescriptor, tally: &mut MergeTally) -> Result<()> {
        for row in backup_schema.read_rows(self.backup, NOTE_TAGS_TABLE)? {
            let (Some(note_id), Some(tag_id)) = (row.i64("note_id"), row.i64("tag_id")) else {
                continue;
            };

            let exists = self
                .live
                .query_row(
                    "SELECT 1 FROM note_tags WHERE note_id = ?1 AND tag_id = ?2",
                    params![note_id, tag_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                continue;
            }

            match self.live.execute(
                "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2)",
                params![note_id, tag_id],
            ) {
                Ok(inserted) => tally.associations += inserted,
                Err(rusqlite::Error::SqliteFailure(error, _))
                    if error.code == ErrorCode::ConstraintViolation =>
                {
                    tracing::warn!(note_id, tag_id, "Live store rejected association");
                    tally.skipped_associations += 1;
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok(())
    }
}
