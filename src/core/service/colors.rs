//! Tag colors and the per-item color overlay

use std::collections::{BTreeMap, HashMap};

use rusqlite::params;
use tracing::debug;

use super::TagService;
use crate::core::error::Result;
use crate::core::notifier::{EntityKind, Event, Notification};
use crate::core::prefs::TAG_COLORS;
use crate::core::tag::normalize_name;

/// Color reported for tags without an assignment
pub const DEFAULT_COLOR: &str = "#000000";

impl TagService {
    /// Tag name -> color table
    pub fn colors(&self) -> Result<BTreeMap<String, String>> {
        match self.prefs.get(TAG_COLORS)? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(BTreeMap::new()),
        }
    }

    /// Color assigned to a tag name, or the default
    pub fn color(&self, name: &str) -> Result<String> {
        Ok(self
            .colors()?
            .remove(normalize_name(name))
            .unwrap_or_else(|| DEFAULT_COLOR.to_string()))
    }

    /// Assign a color to a tag name
    ///
    /// `None`, an empty string or the default color removes the assignment.
    pub fn set_color(&mut self, name: &str, color: Option<&str>) -> Result<()> {
        let name = normalize_name(name);
        let mut colors = self.colors()?;
        match color.map(str::trim) {
            Some(color) if !color.is_empty() && !color.eq_ignore_ascii_case(DEFAULT_COLOR) => {
                colors.insert(name.to_string(), color.to_string());
            }
            _ => {
                colors.remove(name);
            }
        }
        self.prefs.set(TAG_COLORS, &serde_json::to_string(&colors)?)?;

        debug!(name, ?color, "tag color changed");
        self.overlay.invalidate();
        self.emit(vec![Notification::new(Event::Redraw, EntityKind::Item, Vec::new())]);
        Ok(())
    }

    /// Display color of an item, derived from the colors of its tags
    ///
    /// When several of an item's tags carry colors, the name sorting last
    /// wins; callers should not rely on which.
    pub fn item_color(&mut self, item_id: i64) -> Result<Option<String>> {
        let library_id: Option<i64> = match self.db.row_query(
            "SELECT libraryID FROM items WHERE itemID = ?1",
            params![item_id],
            |row| Ok(row.get(0)?),
        )? {
            Some(library_id) => library_id,
            None => return Ok(None),
        };

        if !self.overlay.is_built(library_id) {
            let built = self.build_overlay(library_id)?;
            debug!(library = ?library_id, items = built.len(), "built color overlay");
            self.overlay.install(library_id, built);
        }
        Ok(self
            .overlay
            .item_color(library_id, item_id)
            .map(str::to_string))
    }

    fn build_overlay(&self, library_id: Option<i64>) -> Result<HashMap<i64, String>> {
        let mut by_item = HashMap::new();
        for (name, color) in self.colors()? {
            let items: Vec<i64> = self.db.column_query(
                "SELECT DISTINCT itemID FROM itemTags JOIN tags USING (tagID) \
                 WHERE name = ?1 AND libraryID IS ?2",
                params![name, library_id],
            )?;
            for item in items {
                by_item.insert(item, color.clone());
            }
        }
        Ok(by_item)
    }
}
