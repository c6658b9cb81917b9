//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::collation::Strength;
use crate::core::project::Project;

/// tagkeep configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library commands act on
    pub library: Option<i64>,

    /// Log filter directive used when TAGKEEP_LOG is unset
    pub log_level: Option<String>,

    /// Milliseconds to wait on a locked store
    pub busy_timeout_ms: Option<u64>,

    /// Listing order (`case-insensitive` or `case-sensitive`)
    pub collation: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/tagkeep/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.tagkeep/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(library) = std::env::var("TAGKEEP_LIBRARY") {
            if let Ok(library) = library.trim().parse() {
                config.library = Some(library);
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tagkeep")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.library.is_some() {
            self.library = other.library;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.busy_timeout_ms.is_some() {
            self.busy_timeout_ms = other.busy_timeout_ms;
        }
        if other.collation.is_some() {
            self.collation = other.collation;
        }
    }

    /// Collation strength for listings, falling back to case-insensitive
    pub fn strength(&self) -> Strength {
        match self.collation.as_deref().map(str::parse::<Strength>) {
            Some(Ok(strength)) => strength,
            Some(Err(_)) => {
                tracing::warn!(
                    "unknown collation {:?}, using case-insensitive",
                    self.collation
                );
                Strength::default()
            }
            None => Strength::default(),
        }
    }
}
