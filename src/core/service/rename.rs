//! Rename, merging into an existing manual tag on collision

use std::collections::HashSet;
use std::rc::Rc;

use rusqlite::params;
use tracing::{debug, info};

use super::{old_snapshots, TagService};
use crate::core::db::Transaction;
use crate::core::error::{Result, TagError};
use crate::core::notifier::{Event, Notification};
use crate::core::tag::{normalize_name, Tag, TagType};

/// What `rename` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The name was already the requested one
    Unchanged,
    /// The tag kept its id and took the new name (and became manual)
    Renamed,
    /// Another manual tag already had the name; links moved there and the
    /// renamed tag was deleted
    Merged { into: i64, name_rewritten: bool },
}

impl TagService {
    /// Rename a tag
    ///
    /// Renamed tags always become manual. If a different manual tag in the
    /// same library already carries the name (compared case-insensitively),
    /// the two are merged instead: links move to the existing tag, which
    /// takes the requested casing, and the renamed tag is deleted.
    pub fn rename(&mut self, id: i64, new_name: &str) -> Result<RenameOutcome> {
        let name = normalize_name(new_name).to_string();
        if name.is_empty() {
            return Err(TagError::malformed("name", "is empty"));
        }
        debug!(tag = id, name = %name, "renaming tag");

        let db = Rc::clone(&self.db);
        let tx = db.begin()?;

        let old = self.get(id)?.cloned().ok_or(TagError::NotFound { id })?;
        if old.name == name {
            debug!(tag = id, "tag name hasn't changed");
            tx.commit()?;
            return Ok(RenameOutcome::Unchanged);
        }

        let existing: Option<(i64, String)> = db.row_query(
            "SELECT tagID, name FROM tags WHERE name = ?1 AND type = 0 AND libraryID IS ?2 \
             AND tagID <> ?3 ORDER BY tagID LIMIT 1",
            params![name, old.library_id, id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        if let Some((existing_id, existing_name)) = existing {
            return self.merge_into(tx, &old, existing_id, &existing_name, &name);
        }

        let mut renamed = old.clone();
        renamed.name = name;
        renamed.tag_type = TagType::Manual;
        renamed.save(&db)?;
        tx.commit()?;

        self.identity.remove_tag(&old);
        self.refresh(&[id]);
        // The new name can reach different items
        self.overlay.invalidate();
        self.emit(vec![
            Notification::tags(Event::Modify, &[id]).with_data(old_snapshots([&old])?)
        ]);
        Ok(RenameOutcome::Renamed)
    }

    fn merge_into(
        &mut self,
        tx: Transaction<'_>,
        old: &Tag,
        existing_id: i64,
        existing_name: &str,
        name: &str,
    ) -> Result<RenameOutcome> {
        let db = Rc::clone(&self.db);

        let name_rewritten = existing_name != name;
        if name_rewritten {
            db.execute(
                "UPDATE tags SET name = ?1, dateModified = CURRENT_TIMESTAMP, \
                 clientDateModified = CURRENT_TIMESTAMP WHERE tagID = ?2",
                params![name, existing_id],
            )?;
        }

        let item_ids = self.tag_items(old.id)?;
        let existing_items: HashSet<i64> = self.tag_items(existing_id)?.into_iter().collect();

        // OR REPLACE collapses links the existing tag already has
        db.execute(
            "UPDATE OR REPLACE itemTags SET tagID = ?1 WHERE tagID = ?2",
            params![existing_id, old.id],
        )?;
        db.execute("DELETE FROM tags WHERE tagID = ?1", params![old.id])?;
        tx.commit()?;

        info!(
            from = old.id,
            into = existing_id,
            items = item_ids.len(),
            "merged tag into existing manual tag"
        );

        self.unload(&[old.id]);
        self.overlay.invalidate();

        let mut notifications =
            vec![Notification::tags(Event::Delete, &[old.id]).with_data(old_snapshots([old])?)];

        let removed: Vec<(i64, i64)> = item_ids.iter().map(|&item| (item, old.id)).collect();
        if !removed.is_empty() {
            notifications.push(Notification::item_tags(Event::Remove, &removed));
        }

        let added: Vec<(i64, i64)> = item_ids
            .iter()
            .filter(|item| !existing_items.contains(item))
            .map(|&item| (item, existing_id))
            .collect();
        if !added.is_empty() {
            notifications.push(Notification::item_tags(Event::Add, &added));
        }

        if name_rewritten {
            self.refresh(&[existing_id]);
            notifications.push(Notification::tags(Event::Modify, &[existing_id]));
        }

        self.emit(notifications);
        Ok(RenameOutcome::Merged {
            into: existing_id,
            name_rewritten,
        })
    }
}
