//! Core module - tag store, caches and the tag service

pub mod cache;
pub mod collation;
pub mod config;
pub mod db;
pub mod error;
pub mod notifier;
pub mod prefs;
pub mod project;
pub mod search;
pub mod service;
pub mod tag;
pub mod watchdog;

pub use cache::CacheStats;
pub use config::Config;
pub use db::Database;
pub use error::{Result, TagError};
pub use notifier::{EntityKind, Event, Notification, Notifier};
pub use prefs::{FilePrefs, MemoryPrefs, Preferences};
pub use project::{Project, ProjectError};
pub use service::{RenameOutcome, TagService};
pub use tag::{Tag, TagType};
