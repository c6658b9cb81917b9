//! Object cache: tag id -> Tag record

use std::collections::{HashMap, HashSet};

use crate::core::db::Database;
use crate::core::error::Result;
use crate::core::tag::{Tag, TAG_COLUMNS};

/// What a reload changed, so the identity index can follow in lockstep
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Ids present in the store and now cached
    pub loaded: Vec<i64>,
    /// Entries removed because their rows no longer exist
    pub evicted: Vec<Tag>,
    /// Previous versions of entries whose name, type or library changed
    pub replaced: Vec<Tag>,
}

#[derive(Debug, Default)]
pub struct ObjectCache {
    tags: HashMap<i64, Tag>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i64) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.tags.contains_key(&id)
    }

    /// Cache a freshly written record, replacing any previous version
    pub fn insert(&mut self, tag: Tag) -> Option<Tag> {
        self.tags.insert(tag.id, tag)
    }

    pub fn remove(&mut self, id: i64) -> Option<Tag> {
        self.tags.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Load tags from the store
    ///
    /// With `ids`, only those rows are reloaded and requested ids that no
    /// longer exist are evicted. Without, every row is loaded and any cached
    /// entry missing from the store is evicted.
    pub fn load(&mut self, db: &Database, ids: Option<&[i64]>) -> Result<LoadReport> {
        let rows = match ids {
            Some([]) => return Ok(LoadReport::default()),
            Some(ids) => {
                let list = ids
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                db.query_rows(
                    &format!("SELECT {} FROM tags WHERE tagID IN ({})", TAG_COLUMNS, list),
                    [],
                    Tag::from_row,
                )?
            }
            None => db.query_rows(
                &format!("SELECT {} FROM tags", TAG_COLUMNS),
                [],
                Tag::from_row,
            )?,
        };

        let mut report = LoadReport::default();
        for tag in rows {
            report.loaded.push(tag.id);
            if let Some(previous) = self.tags.insert(tag.id, tag) {
                let current = &self.tags[&previous.id];
                if previous.name != current.name
                    || previous.tag_type != current.tag_type
                    || previous.library_id != current.library_id
                {
                    report.replaced.push(previous);
                }
            }
        }

        let present: HashSet<i64> = report.loaded.iter().copied().collect();
        let candidates: Vec<i64> = match ids {
            Some(ids) => ids.to_vec(),
            None => self.tags.keys().copied().collect(),
        };
        for id in candidates {
            if !present.contains(&id) {
                if let Some(gone) = self.tags.remove(&id) {
                    report.evicted.push(gone);
                }
            }
        }

        Ok(report)
    }
}
