//! Application configuration
//!
//! Values are resolved from, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or `BOOK_CATALOG_CONFIG`)
//! 3. `BOOK_CATALOG_*` environment variables
//! 4. Command-line flags, applied by `main.rs`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

/// Environment variable prefix
const ENV_PREFIX: &str = "BOOK_CATALOG";
/// Catalog file name used by existing catalogs, relative to the working
/// directory.
const DEFAULT_CATALOG_FILE: &str = "books.txt";
const LOG_FILE_NAME: &str = "book-catalog.log";
const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "book-catalog";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The delimited text file holding the catalog.
    pub catalog_file: PathBuf,
    /// Where tracing output goes. `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_file: PathBuf::from(DEFAULT_CATALOG_FILE),
            log_file: default_log_file(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` (or the default location) and apply environment
    /// overrides. A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_file_path(),
        };

        let mut config = match path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            _ => Self::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config TOML")
    }

    /// Apply `BOOK_CATALOG_*` overrides looked up through `lookup`. An empty
    /// `BOOK_CATALOG_LOG_FILE` turns logging off.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(&format!("{ENV_PREFIX}_FILE")) {
            self.catalog_file = PathBuf::from(val);
        }

        if let Some(val) = lookup(&format!("{ENV_PREFIX}_LOG_FILE")) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Some(val) = lookup(&format!("{ENV_PREFIX}_LOG_LEVEL")) {
            if !val.trim().is_empty() {
                self.log_level = val;
            }
        }
    }

    /// `BOOK_CATALOG_CONFIG`, else `<config dir>/book-catalog/config.toml`.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(format!("{ENV_PREFIX}_CONFIG")) {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn default_log_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
}
