//! Engine configuration, loadable from a TOML file.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{storage::paths::DataPaths, types::error::Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding `ruanko.db` and one sub-directory per database.
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Always listed first and never droppable.
    #[serde(default = "default_system_database")]
    pub system_database: String,

    /// Sub-directory of the root where backup archives go by default.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    #[serde(default = "default_drop_retry_attempts")]
    pub drop_retry_attempts: u32,

    #[serde(default = "default_drop_retry_delay_ms")]
    pub drop_retry_delay_ms: u64,
}

fn default_root_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_system_database() -> String {
    "system".to_string()
}

fn default_backup_dir() -> String {
    "backup".to_string()
}

fn default_drop_retry_attempts() -> u32 {
    3
}

fn default_drop_retry_delay_ms() -> u64 {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            system_database: default_system_database(),
            backup_dir: default_backup_dir(),
            drop_retry_attempts: default_drop_retry_attempts(),
            drop_retry_delay_ms: default_drop_retry_delay_ms(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::new(&self.root_path)
    }

    pub fn drop_retry_delay(&self) -> Duration {
        Duration::from_millis(self.drop_retry_delay_ms)
    }

    /// Names that can never be created, dropped or restored over.
    pub fn is_reserved_database(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.system_database) || name.eq_ignore_ascii_case(&self.backup_dir)
    }
}
