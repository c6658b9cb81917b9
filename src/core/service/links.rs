//! Tag creation and item links

use std::rc::Rc;

use rusqlite::params;
use tracing::debug;

use super::TagService;
use crate::core::error::{Result, TagError};
use crate::core::notifier::{Event, Notification};
use crate::core::prefs::PURGE_TAGS;
use crate::core::tag::{Tag, TagType};

impl TagService {
    /// Id of the tag with this identity, creating it when absent
    pub fn add(&mut self, name: &str, tag_type: TagType, library_id: Option<i64>) -> Result<i64> {
        if let Some(id) = self.resolve_id(name, tag_type, library_id)? {
            return Ok(id);
        }

        let db = Rc::clone(&self.db);
        let tx = db.begin()?;
        let tag = Tag::insert(&db, name, tag_type, library_id)?;
        tx.commit()?;

        let id = tag.id;
        debug!(tag = id, name = %tag.name, "created tag");
        self.identity.insert(library_id, tag_type, &tag.name, id);
        self.objects.insert(tag);
        self.emit(vec![Notification::tags(Event::Add, &[id])]);
        Ok(id)
    }

    /// Register an item so it can carry tags
    pub fn add_item(&mut self, item_id: i64, library_id: Option<i64>) -> Result<()> {
        self.db.execute(
            "INSERT INTO items (itemID, libraryID) VALUES (?1, ?2) \
             ON CONFLICT(itemID) DO UPDATE SET libraryID = excluded.libraryID",
            params![item_id, library_id],
        )?;
        self.overlay.invalidate();
        Ok(())
    }

    /// Link an item to a tag; false if the link already existed
    pub fn link(&mut self, item_id: i64, tag_id: i64) -> Result<bool> {
        if self.get(tag_id)?.is_none() {
            return Err(TagError::NotFound { id: tag_id });
        }
        self.require_item(item_id)?;

        let changed = self.db.execute(
            "INSERT OR IGNORE INTO itemTags (itemID, tagID) VALUES (?1, ?2)",
            params![item_id, tag_id],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        self.overlay.invalidate();
        self.emit(vec![Notification::item_tags(
            Event::Add,
            &[(item_id, tag_id)],
        )]);
        Ok(true)
    }

    /// Remove an item's link to a tag; false if there was none
    ///
    /// The tag itself stays, so a later orphan purge is flagged.
    pub fn unlink(&mut self, item_id: i64, tag_id: i64) -> Result<bool> {
        let changed = self.db.execute(
            "DELETE FROM itemTags WHERE itemID = ?1 AND tagID = ?2",
            params![item_id, tag_id],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        self.prefs.set_bool(PURGE_TAGS, true)?;
        self.overlay.invalidate();
        self.emit(vec![Notification::item_tags(
            Event::Remove,
            &[(item_id, tag_id)],
        )]);
        Ok(true)
    }

    /// Tag ids linked to an item
    pub fn item_tags(&self, item_id: i64) -> Result<Vec<i64>> {
        self.db.column_query(
            "SELECT tagID FROM itemTags WHERE itemID = ?1 ORDER BY tagID",
            params![item_id],
        )
    }

    /// Library of an item, failing when the item is unknown
    pub(super) fn require_item(&self, item_id: i64) -> Result<Option<i64>> {
        self.db
            .row_query(
                "SELECT libraryID FROM items WHERE itemID = ?1",
                params![item_id],
                |row| Ok(row.get::<_, Option<i64>>(0)?),
            )?
            .ok_or(TagError::ItemNotFound { id: item_id })
    }
}
