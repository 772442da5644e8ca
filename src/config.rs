//! Configuration loading and management
//!
//! Handles parsing of `taskdeck.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::{FileSlot, TaskPersistence, DEFAULT_STORAGE_KEY, SCHEMA_VERSION};
use crate::view::{SortConfig, SortCriterion, SortDirection, StatusFilter};
use crate::view_state::ViewState;

/// Name of the configuration file looked up by [`Config::load_from_dir`]
pub const CONFIG_FILE: &str = "taskdeck.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the task collection is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Initial view selection
    #[serde(default)]
    pub view: ViewConfig,
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the storage slot, relative to the config root
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Key the collection is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Schema version written with, and required of, the stored record
    #[serde(default)]
    pub version: u32,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".taskdeck")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: default_storage_key(),
            version: SCHEMA_VERSION,
        }
    }
}

/// Initial view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Status filter: all, active or completed
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Sort criterion: title, priority, dueDate or creationDate
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Sort direction: asc or desc
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_filter() -> String {
    "all".to_string()
}

fn default_sort_by() -> String {
    "creationDate".to_string()
}

fn default_direction() -> String {
    "desc".to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            sort_by: default_sort_by(),
            direction: default_direction(),
        }
    }
}

impl StorageConfig {
    /// File-backed persistence rooted at `root`
    pub fn persistence(&self, root: &Path) -> TaskPersistence<FileSlot> {
        let dir = if self.dir.is_absolute() {
            self.dir.clone()
        } else {
            root.join(&self.dir)
        };
        TaskPersistence::with_key(FileSlot::new(dir), self.key.clone(), self.version)
    }

    fn validate(&self) -> Result<()> {
        let key = self.key.trim();
        if key.is_empty() {
            return Err(Error::InvalidConfig(
                "storage.key cannot be empty".to_string(),
            ));
        }
        if key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::InvalidConfig(format!(
                "storage.key '{key}' must not contain path separators"
            )));
        }
        if self.dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "storage.dir cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl ViewConfig {
    /// View state the session starts with.
    ///
    /// Unknown sort criteria fall back to unsorted order.
    pub fn initial_state(&self) -> Result<ViewState> {
        let filter: StatusFilter = self
            .filter
            .parse()
            .map_err(|err: Error| Error::InvalidConfig(format!("view.filter: {err}")))?;
        let direction: SortDirection = self
            .direction
            .parse()
            .map_err(|err: Error| Error::InvalidConfig(format!("view.direction: {err}")))?;
        let sort = SortConfig::new(SortCriterion::parse(&self.sort_by), direction);
        Ok(ViewState::new(filter, sort))
    }

    fn validate(&self) -> Result<()> {
        self.initial_state().map(|_| ())
    }
}

impl Config {
    /// Load configuration from a `taskdeck.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `dir`, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "invalid config; using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.view.validate()?;
        Ok(())
    }
}
