//! Identity index: (library, type, folded name) -> tag id
//!
//! Populated lazily by lookups. An entry only exists for names that were
//! actually resolved, so a miss says nothing about the store.

use std::collections::HashMap;

use crate::core::tag::{fold_name, Tag, TagType};

#[derive(Debug, Default)]
pub struct IdentityIndex {
    entries: HashMap<Option<i64>, HashMap<i64, HashMap<String, i64>>>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, library_id: Option<i64>, tag_type: TagType, name: &str) -> Option<i64> {
        self.entries
            .get(&library_id)?
            .get(&tag_type.raw())?
            .get(&fold_name(name))
            .copied()
    }

    pub fn insert(&mut self, library_id: Option<i64>, tag_type: TagType, name: &str, id: i64) {
        self.entries
            .entry(library_id)
            .or_default()
            .entry(tag_type.raw())
            .or_default()
            .insert(fold_name(name), id);
    }

    /// Drop the entry for `tag` if it still points at that tag
    ///
    /// Differently cased duplicates share a folded key, so an entry that
    /// resolved to another row is left alone.
    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        let Some(by_type) = self.entries.get_mut(&tag.library_id) else {
            return false;
        };
        let Some(by_name) = by_type.get_mut(&tag.tag_type.raw()) else {
            return false;
        };
        let key = fold_name(&tag.name);
        if by_name.get(&key) == Some(&tag.id) {
            by_name.remove(&key);
            return true;
        }
        false
    }

    /// Drop every entry pointing at `id`, whatever name it was resolved under
    pub fn remove_id(&mut self, id: i64) {
        for by_type in self.entries.values_mut() {
            for by_name in by_type.values_mut() {
                by_name.retain(|_, v| *v != id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|by_type| by_type.values())
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
