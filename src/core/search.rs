//! Saved searches that restrict tag listings to a set of items

use crate::core::error::Result;

/// A search producing item ids
///
/// Implementations backed by persisted searches fail with
/// `TagError::SavedSearchMissing` when the search was deleted.
pub trait SavedSearch {
    fn item_ids(&self) -> Result<Vec<i64>>;
}

/// A fixed set of items
#[derive(Debug, Clone, Default)]
pub struct ItemSet(pub Vec<i64>);

impl SavedSearch for ItemSet {
    fn item_ids(&self) -> Result<Vec<i64>> {
        Ok(self.0.clone())
    }
}
