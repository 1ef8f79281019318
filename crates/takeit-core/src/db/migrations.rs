//! Database migrations

use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::error::Result;

/// Current schema version
pub const CURRENT_VERSION: i32 = 4;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        apply(conn, 1, migrate_v1)?;
    }
    if version < 2 {
        apply(conn, 2, migrate_v2)?;
    }
    if version < 3 {
        apply(conn, 3, migrate_v3)?;
    }
    if version < 4 {
        apply(conn, 4, migrate_v4)?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Run one migration in its own transaction and record it
fn apply(
    conn: &Connection,
    version: i32,
    migration: fn(&Transaction<'_>) -> Result<()>,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    migration(&tx)?;
    tx.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    tx.commit()?;

    tracing::info!("Migrated database to version {version}");
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// `ALTER TABLE ... ADD COLUMN` unless a pre-versioning file already has it
fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<()> {
    if !has_column(conn, table, column)? {
        conn.execute_batch(&format!(
            "ALTER TABLE {table} ADD COLUMN {column} {definition}"
        ))?;
    }
    Ok(())
}

/// Migration to version 1: legacy schema (notes, tags, note_tags)
fn migrate_v1(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY,
            content TEXT,
            timestamp INTEGER
        );
        CREATE TABLE IF NOT EXISTS tags (
            tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_name TEXT UNIQUE,
            tag_color TEXT DEFAULT '#6200EE'
        );
        CREATE TABLE IF NOT EXISTS note_tags (
            note_id INTEGER,
            tag_id INTEGER,
            PRIMARY KEY (note_id, tag_id),
            FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(tag_id) ON DELETE CASCADE
        );",
    )?;

    // Files created before tag colors existed
    add_column_if_missing(tx, "tags", "tag_color", "TEXT DEFAULT '#6200EE'")
}

/// Migration to version 2: separate creation and modification times
fn migrate_v2(tx: &Transaction<'_>) -> Result<()> {
    add_column_if_missing(tx, "notes", "created_time", "INTEGER")?;
    add_column_if_missing(tx, "notes", "modified_time", "INTEGER")?;
    tx.execute_batch(
        "UPDATE notes SET
            created_time = COALESCE(created_time, timestamp, 0),
            modified_time = COALESCE(modified_time, timestamp, created_time, 0);
        CREATE INDEX IF NOT EXISTS idx_notes_modified ON notes(modified_time DESC);",
    )?;
    Ok(())
}

/// Migration to version 3: custom properties document
fn migrate_v3(tx: &Transaction<'_>) -> Result<()> {
    add_column_if_missing(tx, "notes", "custom_properties", "TEXT DEFAULT '{}'")
}

/// Migration to version 4: soft delete flag for the recycle bin
fn migrate_v4(tx: &Transaction<'_>) -> Result<()> {
    add_column_if_missing(tx, "notes", "deleted", "INTEGER NOT NULL DEFAULT 0")?;
    tx.execute_batch("CREATE INDEX IF NOT EXISTS idx_notes_deleted ON notes(deleted)")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_migrations() {
        let conn = setup();
        run(&conn).unwrap();

        let version = get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = setup();
        run(&conn).unwrap();
        run(&conn).unwrap(); // Should not fail

        let version = get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migration_upgrades_legacy_file() {
        let conn = setup();
        conn.execute_batch(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, content TEXT, timestamp INTEGER);
             CREATE TABLE tags (tag_id INTEGER PRIMARY KEY AUTOINCREMENT, tag_name TEXT UNIQUE);
             INSERT INTO notes (id, content, timestamp) VALUES (1, 'old', 500);",
        )
        .unwrap();

        run(&conn).unwrap();

        assert!(has_column(&conn, "tags", "tag_color").unwrap());
        assert!(has_column(&conn, "notes", "deleted").unwrap());
        let (created, modified, properties): (i64, i64, Option<String>) = conn
            .query_row(
                "SELECT created_time, modified_time, custom_properties FROM notes WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!((created, modified), (500, 500));
        assert_eq!(properties.as_deref(), Some("{}"));
    }

    #[test]
    fn test_migration_keeps_columns_of_unversioned_current_file() {
        let conn = setup();
        conn.execute_batch(
            "CREATE TABLE notes (
                id INTEGER PRIMARY KEY, content TEXT, timestamp INTEGER,
                created_time INTEGER, modified_time INTEGER,
                custom_properties TEXT, deleted INTEGER
             );",
        )
        .unwrap();

        run(&conn).unwrap();
        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }
}
