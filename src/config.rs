//! Configuration loading.
//!
//! The data directory comes from `--data-dir`, then `PLANNER_DIR`, then
//! `$HOME/.planner`. An optional `config.toml` inside it tunes behavior.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Default data directory name under `$HOME`.
pub const DEFAULT_DIR: &str = ".planner";

/// First day of the week used by "this week" queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub week_start: WeekStart,

    /// Seed the sample task set when the task collection is empty.
    #[serde(default = "default_seed")]
    pub seed_sample_data: bool,
}

fn default_seed() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            seed_sample_data: default_seed(),
        }
    }
}

impl Config {
    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `config.toml` from the data directory, or defaults if absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write a default `config.toml` into `dir` unless one exists.
    /// Returns the path when a file was written.
    pub fn write_default_if_missing(dir: &Path) -> Result<Option<PathBuf>> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            return Ok(None);
        }
        Self::default().save(&path)?;
        Ok(Some(path))
    }
}

/// Resolve the data directory and make sure it exists.
///
/// `explicit` already folds in the `PLANNER_DIR` environment variable when it
/// comes from the CLI.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir,
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(DEFAULT_DIR)
        }
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
