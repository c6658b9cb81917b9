//! Tag record: typed row decode plus load, insert, save and erase

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::FromSql;
use rusqlite::{params, Row};
use serde::Serialize;

use crate::core::db::Database;
use crate::core::error::{Result, TagError};

/// Column list matching `Tag::from_row`
pub(crate) const TAG_COLUMNS: &str =
    "tagID, name, type, libraryID, dateAdded, dateModified, clientDateModified";

/// SQLite `CURRENT_TIMESTAMP` text format
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tag provenance
///
/// Stored as an integer: 0 is manual, anything else is automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i64")]
pub enum TagType {
    /// Assigned by a user
    Manual,
    /// Assigned by import or another system process
    Automatic(i64),
}

impl TagType {
    /// The automatic type used when none more specific is known
    pub const AUTOMATIC: TagType = TagType::Automatic(1);

    pub fn from_raw(raw: i64) -> Self {
        if raw == 0 {
            TagType::Manual
        } else {
            TagType::Automatic(raw)
        }
    }

    pub fn raw(&self) -> i64 {
        match self {
            TagType::Manual => 0,
            TagType::Automatic(raw) => *raw,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, TagType::Manual)
    }
}

impl From<TagType> for i64 {
    fn from(tag_type: TagType) -> Self {
        tag_type.raw()
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagType::Manual => write!(f, "manual"),
            TagType::Automatic(1) => write!(f, "automatic"),
            TagType::Automatic(raw) => write!(f, "automatic({})", raw),
        }
    }
}

impl FromStr for TagType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" | "m" => Ok(TagType::Manual),
            "automatic" | "auto" | "a" => Ok(TagType::AUTOMATIC),
            other => other
                .parse::<i64>()
                .map(TagType::from_raw)
                .map_err(|_| format!("invalid tag type '{}' (expected manual, automatic or a number)", s)),
        }
    }
}

/// Trim surrounding whitespace; case is preserved
pub fn normalize_name(name: &str) -> &str {
    name.trim()
}

/// Comparison key for a tag name: trimmed and lowercased
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One persisted tag row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub tag_type: TagType,
    pub library_id: Option<i64>,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub client_date_modified: DateTime<Utc>,
}

impl Tag {
    /// Decode a row selected with `TAG_COLUMNS`
    ///
    /// Missing or mistyped columns are reported as `MalformedRow` rather than
    /// producing a partially filled record.
    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        let id: i64 = column(row, "tagID")?;
        let name: String = column(row, "name")?;
        let name = normalize_name(&name).to_string();
        if name.is_empty() {
            return Err(TagError::malformed("name", "is empty"));
        }
        let raw_type: i64 = column(row, "type")?;

        Ok(Tag {
            id,
            name,
            tag_type: TagType::from_raw(raw_type),
            library_id: column(row, "libraryID")?,
            date_added: timestamp(row, "dateAdded")?,
            date_modified: timestamp(row, "dateModified")?,
            client_date_modified: timestamp(row, "clientDateModified")?,
        })
    }

    /// Load a single tag by id
    pub fn load(db: &Database, id: i64) -> Result<Option<Self>> {
        db.row_query(
            &format!("SELECT {} FROM tags WHERE tagID = ?1", TAG_COLUMNS),
            params![id],
            Tag::from_row,
        )
    }

    /// Insert a new tag row and return it as stored
    pub fn insert(
        db: &Database,
        name: &str,
        tag_type: TagType,
        library_id: Option<i64>,
    ) -> Result<Self> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(TagError::malformed("name", "is empty"));
        }
        db.execute(
            "INSERT INTO tags (name, type, libraryID) VALUES (?1, ?2, ?3)",
            params![name, tag_type.raw(), library_id],
        )?;
        let id = db.last_insert_rowid();
        Tag::load(db, id)?.ok_or(TagError::NotFound { id })
    }

    /// Write name and type back to the store and stamp modification times
    pub fn save(&self, db: &Database) -> Result<()> {
        let changed = db.execute(
            "UPDATE tags SET name = ?1, type = ?2, dateModified = CURRENT_TIMESTAMP, \
             clientDateModified = CURRENT_TIMESTAMP WHERE tagID = ?3",
            params![self.name, self.tag_type.raw(), self.id],
        )?;
        if changed == 0 {
            return Err(TagError::NotFound { id: self.id });
        }
        Ok(())
    }

    /// Delete this tag and its item links, returning the items that were linked
    pub fn erase(&self, db: &Database) -> Result<Vec<i64>> {
        let items = self.linked_items(db)?;
        db.execute("DELETE FROM itemTags WHERE tagID = ?1", params![self.id])?;
        db.execute("DELETE FROM tags WHERE tagID = ?1", params![self.id])?;
        Ok(items)
    }

    /// Item ids currently linked to this tag
    pub fn linked_items(&self, db: &Database) -> Result<Vec<i64>> {
        db.column_query(
            "SELECT itemID FROM itemTags WHERE tagID = ?1 ORDER BY itemID",
            params![self.id],
        )
    }

    /// JSON snapshot used in notification payloads
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn column<T: FromSql>(row: &Row<'_>, field: &'static str) -> Result<T> {
    row.get(field)
        .map_err(|e| TagError::malformed(field, e.to_string()))
}

fn timestamp(row: &Row<'_>, field: &'static str) -> Result<DateTime<Utc>> {
    let text: String = column(row, field)?;
    let naive = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map_err(|e| TagError::malformed(field, format!("'{}': {}", text, e)))?;
    Ok(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_raw_mapping() {
        assert_eq!(TagType::from_raw(0), TagType::Manual);
        assert_eq!(TagType::from_raw(1), TagType::AUTOMATIC);
        assert_eq!(TagType::from_raw(7).raw(), 7);
        assert!(TagType::Manual.is_manual());
        assert!(!TagType::from_raw(2).is_manual());
    }

    #[test]
    fn test_tag_type_parse() {
        assert_eq!("manual".parse::<TagType>().unwrap(), TagType::Manual);
        assert_eq!("Auto".parse::<TagType>().unwrap(), TagType::AUTOMATIC);
        assert_eq!("0".parse::<TagType>().unwrap(), TagType::Manual);
        assert!("sometimes".parse::<TagType>().is_err());
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("  Read Later "), "read later");
        assert_eq!(normalize_name("  Read Later "), "Read Later");
    }

    #[test]
    fn test_insert_load_save() {
        let db = Database::open_in_memory().unwrap();
        let tag = Tag::insert(&db, "  Physics ", TagType::AUTOMATIC, Some(3)).unwrap();
        assert_eq!(tag.name, "Physics");
        assert_eq!(tag.library_id, Some(3));

        let mut renamed = tag.clone();
        renamed.name = "Optics".to_string();
        renamed.tag_type = TagType::Manual;
        renamed.save(&db).unwrap();

        let loaded = Tag::load(&db, tag.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Optics");
        assert_eq!(loaded.tag_type, TagType::Manual);
    }

    #[test]
    fn test_insert_rejects_blank_name() {
        let db = Database::open_in_memory().unwrap();
        let err = Tag::insert(&db, "   ", TagType::Manual, None).unwrap_err();
        assert!(matches!(err, TagError::MalformedRow { field: "name", .. }));
    }

    #[test]
    fn test_malformed_timestamp_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "INSERT INTO tags (tagID, name, type, dateModified) VALUES (5, 'x', 0, 'yesterday')",
            [],
        )
        .unwrap();
        let err = Tag::load(&db, 5).unwrap_err();
        assert!(matches!(
            err,
            TagError::MalformedRow {
                field: "dateModified",
                ..
            }
        ));
    }

    #[test]
    fn test_erase_returns_linked_items() {
        let db = Database::open_in_memory().unwrap();
        db.execute("INSERT INTO items (itemID) VALUES (10), (11)", [])
            .unwrap();
        let tag = Tag::insert(&db, "gone", TagType::Manual, None).unwrap();
        db.execute(
            "INSERT INTO itemTags (itemID, tagID) VALUES (10, ?1), (11, ?1)",
            params![tag.id],
        )
        .unwrap();

        assert_eq!(tag.erase(&db).unwrap(), vec![10, 11]);
        assert!(Tag::load(&db, tag.id).unwrap().is_none());
    }

    #[test]
    fn test_snapshot_uses_raw_type() {
        let db = Database::open_in_memory().unwrap();
        let tag = Tag::insert(&db, "x", TagType::AUTOMATIC, None).unwrap();
        let snap = tag.snapshot().unwrap();
        assert_eq!(snap["type"], serde_json::json!(1));
        assert_eq!(snap["name"], serde_json::json!("x"));
    }
}
