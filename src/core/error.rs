//! Error type shared by the store, caches and tag service

use thiserror::Error;

/// Result alias used throughout `core`
pub type Result<T> = std::result::Result<T, TagError>;

/// Errors that can occur while reading or mutating tags
#[derive(Debug, Error)]
pub enum TagError {
    #[error("tag {id} not found")]
    NotFound { id: i64 },

    #[error("item {id} not found")]
    ItemNotFound { id: i64 },

    #[error("Saved search {0} does not exist")]
    SavedSearchMissing(i64),

    #[error("malformed tag row: column '{field}' {reason}")]
    MalformedRow { field: &'static str, reason: String },

    #[error("store schema version {found} does not match expected version {expected}")]
    SchemaMismatch { found: i32, expected: i32 },

    #[error("transaction was rolled back by a nested scope")]
    TransactionAborted,

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TagError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        TagError::MalformedRow {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this is the absorbable "saved search is gone" condition
    pub fn is_search_missing(&self) -> bool {
        matches!(self, TagError::SavedSearchMissing(_))
    }
}
