//! Database schema initialization

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::{Result, TagError};

/// Current schema version; a store written by another version is refused
pub const SCHEMA_VERSION: i32 = 1;

/// Create tables if missing and verify the stored schema version
pub(super) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        -- Tags, scoped by library (NULL = no library) and type (0 = manual)
        CREATE TABLE IF NOT EXISTS tags (
            tagID INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            type INTEGER NOT NULL DEFAULT 0,
            libraryID INTEGER,
            dateAdded TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            dateModified TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            clientDateModified TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name);
        CREATE INDEX IF NOT EXISTS idx_tags_library ON tags(libraryID);

        -- Minimal item rows, needed to resolve an item's library
        CREATE TABLE IF NOT EXISTS items (
            itemID INTEGER PRIMARY KEY,
            libraryID INTEGER
        );

        -- Item-tag links
        CREATE TABLE IF NOT EXISTS itemTags (
            itemID INTEGER NOT NULL,
            tagID INTEGER NOT NULL,
            PRIMARY KEY (itemID, tagID),
            FOREIGN KEY (itemID) REFERENCES items(itemID) ON DELETE CASCADE,
            FOREIGN KEY (tagID) REFERENCES tags(tagID) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_itemTags_tag ON itemTags(tagID);
        "#,
    )?;

    let found: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();

    match found {
        None => {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
            Ok(())
        }
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(version) => Err(TagError::SchemaMismatch {
            found: version,
            expected: SCHEMA_VERSION,
        }),
    }
}
