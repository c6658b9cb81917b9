//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory that marks a project root
pub const PROJECT_DIR: &str = ".tagkeep";

/// Represents a tagkeep project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .tagkeep/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create(root)
    }

    /// Initialize even if .tagkeep/ exists, resetting the config file
    ///
    /// The store and preferences are left alone.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.data_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# tagkeep project configuration

# Library that commands act on when --library is not given
# library: 1

# Log filter used when TAGKEEP_LOG is unset (error, warn, info, debug, trace)
# log_level: warn

# How long to wait for a locked store, in milliseconds
# busy_timeout_ms: 5000

# Listing order: case-insensitive or case-sensitive
# collation: case-insensitive
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .tagkeep directory
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// SQLite store holding tags and item links
    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("tags.db")
    }

    /// Preference file (tag colors, pending purge flag)
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir().join("prefs.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir().join("config.yaml")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a tagkeep project (searched from {searched_from:?}). Run 'tagkeep init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("tagkeep project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
