// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use plugin_store_db::{DEFAULT_PAGE_SIZE, OpenOptions};
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PLUGIN_STORE_CONFIG";

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/plugin-store/plugins.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_foreign_keys() -> bool {
    true
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the catalog database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How long SQLite waits on a locked database before giving up
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Enforce foreign keys (rejects versions of unknown artifacts)
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,

    /// Page size for searches that don't specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            foreign_keys: default_foreign_keys(),
            default_page_size: default_page_size(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid {
                reason: "default_page_size must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Session settings derived from this configuration.
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            foreign_keys: self.foreign_keys,
        }
    }
}

/// Load the configuration named by `PLUGIN_STORE_CONFIG`, or the defaults.
pub fn load() -> Result<Config> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => Config::from_file(Path::new(&path)),
        Err(_) => Ok(Config::default()),
    }
}
