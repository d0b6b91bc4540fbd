// Configuration loading with a fallback chain

use crate::filter::Filter;
use crate::slot::{FileSlot, Slot, SqliteSlot};
use crate::store::StoreOptions;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the task list is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `todos.json` inside the data directory
    #[default]
    File,
    /// `todostore.db` inside the data directory
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted task list
    pub data_dir: PathBuf,
    pub backend: Backend,
    /// Filter a session starts with; unknown names mean `all`
    pub default_filter: Filter,
    /// Drop an in-progress edit when its task disappears
    pub reset_edit_on_remove: bool,
    /// Log level used unless `--verbose` is given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todostore");

        Self {
            data_dir,
            backend: Backend::File,
            default_filter: Filter::All,
            reset_edit_on_remove: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, else the first usable default location
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        Ok(Self::load_first(&Self::default_locations()))
    }

    /// `~/.config/todostore/todostore.yml`, then `./todostore.yml`
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("todostore").join("todostore.yml"));
        }
        locations.push(PathBuf::from("todostore.yml"));
        locations
    }

    /// First candidate that exists and parses; defaults if none does
    pub fn load_first(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to load config from {}: {:#}", path.display(), e),
            }
        }

        info!("No config file found, using defaults");
        Self::default()
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// SQLite database used by the sqlite backend
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("todostore.db")
    }

    pub fn open_slot(&self) -> Result<Box<dyn Slot>> {
        let slot: Box<dyn Slot> = match self.backend {
            Backend::File => Box::new(FileSlot::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteSlot::open(self.db_path())?),
        };
        Ok(slot)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            reset_edit_on_remove: self.reset_edit_on_remove,
        }
    }
}
