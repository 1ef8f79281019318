//! Runtime schema introspection.
//!
//! Backups may come from any earlier schema version, so the merge engine never
//! assumes a column exists: it asks the catalog, then reads rows through a
//! [`RowView`] that turns absent columns into `None`.

use std::collections::BTreeMap;

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

pub const NOTES_TABLE: &str = "notes";
pub const TAGS_TABLE: &str = "tags";
pub const NOTE_TAGS_TABLE: &str = "note_tags";

/// Table name to column names in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescriptor {
    tables: BTreeMap<String, Vec<String>>,
}

impl SchemaDescriptor {
    /// Read the catalog of an open store.
    ///
    /// Internal `sqlite_*` tables are skipped. Only reads, so it is safe on a
    /// read-only handle. Never cached: call again after any schema change.
    pub fn describe(conn: &Connection) -> Result<Self> {
        let mut tables_stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY name",
        )?;
        let names = tables_stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut columns_stmt =
            conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let mut tables = BTreeMap::new();
        for name in names {
            let columns = columns_stmt
                .query_map([&name], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            tables.insert(name, columns);
        }

        Ok(Self { tables })
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.columns(table)
            .is_some_and(|columns| columns.iter().any(|c| c == column))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Read every row of `table` as owned [`RowView`]s.
    ///
    /// Returns an empty list when the table does not exist.
    pub fn read_rows(&self, conn: &Connection, table: &str) -> Result<Vec<RowView>> {
        let Some(columns) = self.columns(table) else {
            return Ok(Vec::new());
        };

        let column_list = select_list(columns);
        let mut stmt = conn.prepare(&format!(
            "SELECT {column_list} FROM {}",
            quote_identifier(table)
        ))?;

        let rows = stmt
            .query_map([], |row| RowView::from_row(columns, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Read the row of `table` whose `key_column` equals `key`, if any
    pub fn find_row(
        &self,
        conn: &Connection,
        table: &str,
        key_column: &str,
        key: i64,
    ) -> Result<Option<RowView>> {
        let Some(columns) = self.columns(table) else {
            return Ok(None);
        };

        let column_list = select_list(columns);
        let row = conn
            .query_row(
                &format!(
                    "SELECT {column_list} FROM {} WHERE {} = ?1",
                    quote_identifier(table),
                    quote_identifier(key_column)
                ),
                [key],
                |row| RowView::from_row(columns, row),
            )
            .optional()?;

        Ok(row)
    }
}

fn select_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote an identifier for interpolation into SQL
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One row addressed by column name with typed, absence-tolerant accessors.
///
/// A column missing from the row's schema and a SQL `NULL` both read as `None`;
/// callers pick the default in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl RowView {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    fn from_row(columns: &[String], row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let values = (0..columns.len())
            .map(|index| row.get::<_, Value>(index))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Self::new(columns.to_vec(), values))
    }

    fn value(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Integer value; reals are truncated and numeric text is parsed
    #[allow(clippy::cast_possible_truncation)]
    pub fn i64(&self, column: &str) -> Option<i64> {
        match self.value(column)? {
            Value::Integer(value) => Some(*value),
            Value::Real(value) => Some(*value as i64),
            Value::Text(value) => value.trim().parse().ok(),
            Value::Null | Value::Blob(_) => None,
        }
    }

    /// Text value; numbers are rendered as text
    pub fn text(&self, column: &str) -> Option<String> {
        match self.value(column)? {
            Value::Text(value) => Some(value.clone()),
            Value::Integer(value) => Some(value.to_string()),
            Value::Real(value) => Some(value.to_string()),
            Value::Blob(value) => String::from_utf8(value.clone()).ok(),
            Value::Null => None,
        }
    }

    /// Boolean flag stored as an integer
    pub fn flag(&self, column: &str) -> Option<bool> {
        self.i64(column).map(|value| value != 0)
    }

    /// First present integer among `columns`
    pub fn first_i64(&self, columns: &[&str]) -> Option<i64> {
        columns.iter().find_map(|column| self.i64(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view(pairs: &[(&str, Value)]) -> RowView {
        RowView::new(
            pairs.iter().map(|(c, _)| (*c).to_string()).collect(),
            pairs.iter().map(|(_, v)| v.clone()).collect(),
        )
    }

    #[test]
    fn describe_lists_tables_and_columns_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tags (tag_id INTEGER PRIMARY KEY AUTOINCREMENT, tag_name TEXT);
             CREATE TABLE notes (id INTEGER PRIMARY KEY, content TEXT, timestamp INTEGER);",
        )
        .unwrap();

        let schema = SchemaDescriptor::describe(&conn).unwrap();
        // AUTOINCREMENT creates sqlite_sequence, which must not show up
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["notes", "tags"]);
        assert_eq!(
            schema.columns("notes").unwrap(),
            &["id".to_string(), "content".to_string(), "timestamp".to_string()]
        );
        assert!(schema.has_column("tags", "tag_name"));
        assert!(!schema.has_column("tags", "tag_color"));
        assert!(!schema.has_table("note_tags"));
    }

    #[test]
    fn describe_reflects_schema_changes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY);")
            .unwrap();
        assert!(!SchemaDescriptor::describe(&conn)
            .unwrap()
            .has_column("notes", "deleted"));

        conn.execute_batch("ALTER TABLE notes ADD COLUMN deleted INTEGER;")
            .unwrap();
        assert!(SchemaDescriptor::describe(&conn)
            .unwrap()
            .has_column("notes", "deleted"));
    }

    #[test]
    fn read_rows_of_missing_table_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = SchemaDescriptor::describe(&conn).unwrap();
        assert!(schema.read_rows(&conn, "notes").unwrap().is_empty());
    }

    #[test]
    fn read_rows_returns_named_values() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, content TEXT);
             INSERT INTO notes VALUES (5, 'five');",
        )
        .unwrap();

        let schema = SchemaDescriptor::describe(&conn).unwrap();
        let rows = schema.read_rows(&conn, "notes").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].i64("id"), Some(5));
        assert_eq!(rows[0].text("content").as_deref(), Some("five"));
        assert_eq!(rows[0].text("modified_time"), None);
    }

    #[test]
    fn find_row_by_key() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, content TEXT);
             INSERT INTO notes VALUES (1, 'one'), (2, 'two');",
        )
        .unwrap();

        let schema = SchemaDescriptor::describe(&conn).unwrap();
        let row = schema.find_row(&conn, "notes", "id", 2).unwrap().unwrap();
        assert_eq!(row.text("content").as_deref(), Some("two"));
        assert!(schema.find_row(&conn, "notes", "id", 3).unwrap().is_none());
        assert!(schema.find_row(&conn, "tags", "tag_id", 1).unwrap().is_none());
    }

    #[test]
    fn row_view_coerces_types() {
        let row = view(&[
            ("a", Value::Text(" 42 ".to_string())),
            ("b", Value::Real(7.9)),
            ("c", Value::Null),
            ("d", Value::Integer(1)),
        ]);
        assert_eq!(row.i64("a"), Some(42));
        assert_eq!(row.i64("b"), Some(7));
        assert_eq!(row.i64("c"), None);
        assert_eq!(row.flag("d"), Some(true));
        assert_eq!(row.text("d").as_deref(), Some("1"));
        assert_eq!(row.text("e"), None);
    }

    #[test]
    fn first_i64_skips_absent_and_null() {
        let row = view(&[("timestamp", Value::Integer(9)), ("created_time", Value::Null)]);
        assert_eq!(row.first_i64(&["modified_time", "created_time", "timestamp"]), Some(9));
        assert_eq!(row.first_i64(&["nope"]), None);
    }

    #[test]
    fn quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("notes"), "\"notes\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
