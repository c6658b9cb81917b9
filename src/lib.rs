//! tagkeep: a tag store with caching
//!
//! Tags are named labels attached to items. This crate keeps them in SQLite
//! behind an identity index, an object cache and a per-item color overlay,
//! and supports rename-with-merge, erase, purge of orphaned tags and tag
//! colors.

pub mod cli;
pub mod core;
pub mod logging;
