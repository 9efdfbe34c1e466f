use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const CONFIG_FILE: &str = "kilnbook.json";
pub const DEFAULT_DATA_DIR: &str = ".kilnbook";

/// Settings stored as `kilnbook.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Baseline studio time per day used for utilization ratios.
    #[serde(default = "default_available_minutes")]
    pub available_minutes_per_day: u32,
    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,
    /// Write collections to disk after every mutation.
    #[serde(default = "default_true")]
    pub flush_on_write: bool,
}

fn default_version() -> u32 {
    1
}

fn default_available_minutes() -> u32 {
    8 * 60
}

fn default_search_limit() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::default_init()
    }
}

impl StudioConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Read config from `<data_dir>/kilnbook.json`.
    pub fn load(data_dir: &Path) -> Result<Self, CoreError> {
        let path = Self::path(data_dir);
        let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotInitialized,
            _ => CoreError::Io(e),
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    /// Write config to `<data_dir>/kilnbook.json`.
    pub fn save(&self, data_dir: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(Self::path(data_dir), json)?;
        Ok(())
    }

    /// Default config for `kilnbook init`.
    pub fn default_init() -> Self {
        Self {
            version: default_version(),
            available_minutes_per_day: default_available_minutes(),
            default_search_limit: default_search_limit(),
            flush_on_write: true,
        }
    }
}
