//! Application settings loaded from `~/.improvdb/config.toml` (or the file
//! passed with `--config`). Every key is optional; a missing file means all
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

use crate::columns::ColumnFlags;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".improvdb";
const DB_FILE_NAME: &str = "improvdb.sqlite";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "improvdb.log";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite file; defaults to `~/.improvdb/improvdb.sqlite`.
    pub database_path: Option<PathBuf>,
    pub page_size: usize,
    pub log: LogSettings,
    pub list: ListSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `improvdb=debug`.
    pub level: String,
    /// Log file; defaults to `~/.improvdb/improvdb.log`.
    pub file: Option<PathBuf>,
}

/// Switches for the resource table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListSettings {
    pub show_published_status: bool,
    pub show_edit_proposals: bool,
    pub show_selection: bool,
    pub enable_filtering: bool,
    pub paginate: bool,
    pub no_results_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            page_size: 10,
            log: LogSettings::default(),
            list: ListSettings::default(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            show_published_status: true,
            show_edit_proposals: true,
            show_selection: true,
            enable_filtering: true,
            paginate: true,
            no_results_message: "Try clearing the filters or add a new resource with 'n'."
                .to_string(),
        }
    }
}

impl ListSettings {
    pub fn column_flags(&self) -> ColumnFlags {
        ColumnFlags {
            show_published_status: self.show_published_status,
            show_edit_proposals: self.show_edit_proposals,
            show_selection: self.show_selection,
            enable_filtering: self.enable_filtering,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from the default location when it
    /// exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = data_dir()?.join(CONFIG_FILE_NAME);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        if config.page_size == 0 {
            return Err(anyhow!("page_size must be at least 1"));
        }
        Ok(config)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(LOG_FILE_NAME)),
        }
    }
}

/// `~/.improvdb`, resolved through the platform's home directory.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
