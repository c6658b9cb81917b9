//! Tag service: the facade over the store and its caches
//!
//! Reads go through the identity index and object cache and fall back to the
//! store on a miss. Mutations follow one order:
//! 1. write to the store inside a transaction scope
//! 2. after commit, evict or reload the affected cache entries
//! 3. emit notifications
//!
//! A failure before commit rolls the scope back and leaves caches and
//! listeners untouched.

mod colors;
mod links;
mod lookup;
mod purge;
mod rename;

pub use colors::DEFAULT_COLOR;
pub use rename::RenameOutcome;

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::core::cache::{CacheStats, ColorOverlay, IdentityIndex, LoadReport, ObjectCache};
use crate::core::collation::{Collation, SimpleCollation, Strength};
use crate::core::db::Database;
use crate::core::error::Result;
use crate::core::notifier::{Notification, Notifier, TracingNotifier};
use crate::core::prefs::Preferences;
use crate::core::watchdog::{NoopWatchdog, Watchdog};

pub struct TagService {
    db: Rc<Database>,
    identity: IdentityIndex,
    objects: ObjectCache,
    overlay: ColorOverlay,
    prefs: Box<dyn Preferences>,
    notifier: Box<dyn Notifier>,
    collation: Box<dyn Collation>,
    strength: Strength,
    watchdog: Rc<dyn Watchdog>,
}

impl TagService {
    /// Create a service over `db` with empty caches
    pub fn new(db: Database, prefs: Box<dyn Preferences>) -> Self {
        Self {
            db: Rc::new(db),
            identity: IdentityIndex::new(),
            objects: ObjectCache::new(),
            overlay: ColorOverlay::new(),
            prefs,
            notifier: Box::new(TracingNotifier),
            collation: Box::new(SimpleCollation),
            strength: Strength::default(),
            watchdog: Rc::new(NoopWatchdog),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_collation(mut self, collation: impl Collation + 'static, strength: Strength) -> Self {
        self.collation = Box::new(collation);
        self.strength = strength;
        self
    }

    pub fn with_watchdog(mut self, watchdog: impl Watchdog + 'static) -> Self {
        self.watchdog = Rc::new(watchdog);
        self
    }

    /// The underlying store
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn preferences(&self) -> &dyn Preferences {
        self.prefs.as_ref()
    }

    // =====================================================================
    // Cache control
    // =====================================================================

    /// Drop the identity index and the color overlay
    pub fn invalidate(&mut self) {
        debug!("invalidating identity index and color overlay");
        self.identity.clear();
        self.overlay.invalidate();
    }

    /// Reload the given tags from the store
    pub fn reload(&mut self, ids: &[i64]) -> Result<()> {
        let report = self.objects.load(&self.db, Some(ids))?;
        self.apply_load_report(report);
        Ok(())
    }

    /// Reload every tag, evicting cached tags that no longer exist
    pub fn reload_all(&mut self) -> Result<()> {
        let report = self.objects.load(&self.db, None)?;
        debug!(
            loaded = report.loaded.len(),
            evicted = report.evicted.len(),
            "reloaded all tags"
        );
        self.apply_load_report(report);
        Ok(())
    }

    /// Evict tags from the object cache and identity index
    pub fn unload(&mut self, ids: &[i64]) {
        for &id in ids {
            self.objects.remove(id);
            self.identity.remove_id(id);
        }
    }

    /// Reload tags after a committed write
    ///
    /// The write already stands, so a failed reload evicts the tags instead of
    /// failing the caller; the next read goes back to the store.
    fn refresh(&mut self, ids: &[i64]) {
        if let Err(err) = self.reload(ids) {
            warn!(?ids, error = %err, "reload after commit failed, evicting");
            self.unload(ids);
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            identity_entries: self.identity.len(),
            cached_tags: self.objects.len(),
            overlay_libraries: self.overlay.library_count(),
            store_reads: self.db.read_count(),
        }
    }

    fn apply_load_report(&mut self, report: LoadReport) {
        for tag in report.replaced.iter() {
            self.identity.remove_tag(tag);
        }
        for tag in report.evicted.iter() {
            self.identity.remove_id(tag.id);
        }
    }

    fn emit(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            self.notifier.trigger(notification);
        }
    }
}

/// Remove duplicate ids, keeping first occurrences in order
fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// `{ "<id>": { "old": <snapshot> }, ... }` payload for delete/modify notifications
fn old_snapshots<'a>(
    tags: impl IntoIterator<Item = &'a crate::core::tag::Tag>,
) -> Result<serde_json::Value> {
    let mut data = serde_json::Map::new();
    for tag in tags {
        data.insert(
            tag.id.to_string(),
            serde_json::json!({ "old": tag.snapshot()? }),
        );
    }
    Ok(serde_json::Value::Object(data))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::notifier::RecordingNotifier;
    use crate::core::prefs::MemoryPrefs;
    use crate::core::tag::{Tag, TagType};

    pub fn service() -> (TagService, RecordingNotifier) {
        let recorder = RecordingNotifier::new();
        let db = Database::open_in_memory().unwrap();
        let service = TagService::new(db, Box::new(MemoryPrefs::new())).with_notifier(recorder.clone());
        (service, recorder)
    }

    pub fn item(service: &TagService, item_id: i64, library_id: Option<i64>) {
        service
            .database()
            .execute(
                "INSERT INTO items (itemID, libraryID) VALUES (?1, ?2)",
                rusqlite::params![item_id, library_id],
            )
            .unwrap();
    }

    /// Insert a tag row directly, bypassing the service caches
    pub fn raw_tag(service: &TagService, name: &str, tag_type: TagType, library_id: Option<i64>) -> i64 {
        Tag::insert(service.database(), name, tag_type, library_id)
            .unwrap()
            .id
    }

    pub fn raw_link(service: &TagService, item_id: i64, tag_id: i64) {
        service
            .database()
            .execute(
                "INSERT INTO itemTags (itemID, tagID) VALUES (?1, ?2)",
                rusqlite::params![item_id, tag_id],
            )
            .unwrap();
    }

    pub fn link_count(service: &TagService, item_id: i64, tag_id: i64) -> i64 {
        service
            .database()
            .value_query(
                "SELECT COUNT(*) FROM itemTags WHERE itemID = ?1 AND tagID = ?2",
                rusqlite::params![item_id, tag_id],
            )
            .unwrap()
            .unwrap()
    }

    pub fn tag_exists(service: &TagService, tag_id: i64) -> bool {
        service
            .database()
            .value_query::<i64, _>("SELECT tagID FROM tags WHERE tagID = ?1", [tag_id])
            .unwrap()
            .is_some()
    }
}
