//! CLI command implementations

pub mod color;
pub mod completions;
pub mod init;
pub mod item;
pub mod purge;
pub mod tag;
