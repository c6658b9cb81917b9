//! Bulk erase and orphan purge

use std::rc::Rc;

use tracing::{debug, info};

use super::{dedup_ids, old_snapshots, TagService};
use crate::core::error::Result;
use crate::core::notifier::{Event, Notification};
use crate::core::prefs::PURGE_TAGS;
use crate::core::watchdog::WatchdogPause;

/// Temporary table holding the ids a purge deletes
const PURGE_TABLE: &str = "tagDelete";

impl TagService {
    /// Delete tags and their item links, returning the ids that existed
    pub fn erase(&mut self, ids: &[i64]) -> Result<Vec<i64>> {
        let db = Rc::clone(&self.db);
        let tx = db.begin()?;

        let mut erased = Vec::new();
        let mut links = Vec::new();
        for id in dedup_ids(ids) {
            let Some(tag) = self.get(id)?.cloned() else {
                continue;
            };
            for item in tag.erase(&db)? {
                links.push((item, id));
            }
            erased.push(tag);
        }
        tx.commit()?;

        if erased.is_empty() {
            return Ok(Vec::new());
        }

        let erased_ids: Vec<i64> = erased.iter().map(|tag| tag.id).collect();
        self.unload(&erased_ids);
        self.overlay.invalidate();

        let mut notifications = Vec::new();
        if !links.is_empty() {
            notifications.push(Notification::item_tags(Event::Remove, &links));
        }
        notifications
            .push(Notification::tags(Event::Delete, &erased_ids).with_data(old_snapshots(&erased)?));
        self.emit(notifications);

        Ok(erased_ids)
    }

    /// Delete tags from the store and caches
    ///
    /// With `ids`, exactly those tags are deleted whether or not they are
    /// linked. Without, every tag that has no item links is deleted, but only
    /// if the `purge.tags` preference says orphans may exist. Returns the
    /// deleted ids.
    pub fn purge(&mut self, ids: Option<&[i64]>) -> Result<Vec<i64>> {
        if ids.is_none() && !self.prefs.get_bool(PURGE_TAGS)? {
            debug!("no purge pending");
            return Ok(Vec::new());
        }

        let watchdog = Rc::clone(&self.watchdog);
        let _pause = WatchdogPause::new(watchdog.as_ref());

        let db = Rc::clone(&self.db);
        let tx = db.begin()?;

        match ids {
            Some(ids) => {
                db.create_id_table(PURGE_TABLE, ids)?;
                // Forget ids that have no row
                db.execute(
                    &format!(
                        "DELETE FROM {0} WHERE id NOT IN (SELECT tagID FROM tags)",
                        PURGE_TABLE
                    ),
                    [],
                )?;
            }
            None => {
                let orphans: Vec<i64> = db.column_query(
                    "SELECT tagID FROM tags WHERE tagID NOT IN (SELECT tagID FROM itemTags) \
                     ORDER BY tagID",
                    [],
                )?;
                if orphans.is_empty() {
                    tx.commit()?;
                    self.prefs.set_bool(PURGE_TAGS, false)?;
                    debug!("no orphaned tags");
                    return Ok(Vec::new());
                }
                db.create_id_table(PURGE_TABLE, &orphans)?;
            }
        }

        let to_delete: Vec<i64> =
            db.column_query(&format!("SELECT id FROM {} ORDER BY seq", PURGE_TABLE), [])?;

        let snapshots = old_snapshots(to_delete.iter().filter_map(|id| self.objects.get(*id)))?;

        db.execute(
            &format!(
                "DELETE FROM tags WHERE tagID IN (SELECT id FROM {})",
                PURGE_TABLE
            ),
            [],
        )?;
        db.drop_id_table(PURGE_TABLE)?;
        tx.commit()?;

        info!(count = to_delete.len(), "purged tags");

        self.unload(&to_delete);
        self.overlay.invalidate();
        if !to_delete.is_empty() {
            self.emit(vec![
                Notification::tags(Event::Delete, &to_delete).with_data(snapshots)
            ]);
        }

        self.prefs.set_bool(PURGE_TAGS, false)?;
        Ok(to_delete)
    }
}
