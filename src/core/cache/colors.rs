//! Color overlay: library -> (item -> display color)
//!
//! Purely derived from the tag color preference and item-tag links. It is
//! never updated entry by entry; a library map is built whole and the
//! overlay is dropped whole when colors change.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ColorOverlay {
    by_library: HashMap<Option<i64>, HashMap<i64, String>>,
}

impl ColorOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self, library_id: Option<i64>) -> bool {
        self.by_library.contains_key(&library_id)
    }

    pub fn install(&mut self, library_id: Option<i64>, colors: HashMap<i64, String>) {
        self.by_library.insert(library_id, colors);
    }

    /// Color for an item of a built library
    pub fn item_color(&self, library_id: Option<i64>, item_id: i64) -> Option<&str> {
        self.by_library
            .get(&library_id)?
            .get(&item_id)
            .map(String::as_str)
    }

    pub fn invalidate(&mut self) {
        self.by_library.clear();
    }

    pub fn library_count(&self) -> usize {
        self.by_library.len()
    }
}
