//! Configuration for the kanban board
//!
//! Stored as TOML, by default in the platform config dir
//! (`~/.config/kanban/config.toml` on Linux).

use crate::model::DEFAULT_BOARD_TITLE;
use crate::persist::FileSlot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "kanban";
const CONFIG_FILE: &str = "config.toml";

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the snapshot slot (platform data dir if unset)
    pub data_dir: Option<PathBuf>,

    /// Slot name; the snapshot is stored in `<data_dir>/<slot>.json`
    pub slot: String,

    /// Title for a new, empty board
    pub board_title: String,

    /// Log filter used when RUST_LOG is not set
    pub log_filter: String,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            slot: "snapshot".to_string(),
            board_title: DEFAULT_BOARD_TITLE.to_string(),
            log_filter: "warn".to_string(),
            display: DisplayConfig::default(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Date format for comment timestamps
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.slot.trim().is_empty() {
            return Err(crate::Error::Config("slot must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory that holds the snapshot slot
    pub fn data_dir(&self) -> crate::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| crate::Error::Config("no data directory available".to_string())),
        }
    }

    /// Path of the snapshot file
    pub fn slot_path(&self) -> crate::Result<PathBuf> {
        Ok(self.data_dir()?.join(format!("{}.json", self.slot)))
    }

    /// The file slot this config points at
    pub fn file_slot(&self) -> crate::Result<FileSlot> {
        Ok(FileSlot::new(self.slot_path()?))
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# kanban configuration

# Directory holding the board snapshot (platform data dir if unset)
# data_dir = "/home/me/.local/share/kanban"

# Snapshot slot name; stored as <data_dir>/<slot>.json
slot = "snapshot"

# Title for a new, empty board
board_title = "Task Board"

# Log filter when RUST_LOG is not set
log_filter = "warn"

[display]
# Use colors in output
colors = true

# Date format for comment timestamps (strftime format)
date_format = "%Y-%m-%d %H:%M"
"#
        .to_string()
    }
}
