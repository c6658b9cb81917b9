//! In-memory caches in front of the tag store
//!
//! - `IdentityIndex` maps (library, type, name) to a tag id
//! - `ObjectCache` maps tag ids to loaded records
//! - `ColorOverlay` maps items to display colors, derived per library
//!
//! None of them is authoritative. The tag service keeps them in lockstep
//! with the store; see `core::service`.

mod colors;
mod identity;
mod objects;

pub use colors::ColorOverlay;
pub use identity::IdentityIndex;
pub use objects::{LoadReport, ObjectCache};

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub identity_entries: usize,
    pub cached_tags: usize,
    pub overlay_libraries: usize,
    pub store_reads: u64,
}
