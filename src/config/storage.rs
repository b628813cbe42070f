use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Configuration for the embedded sled storage adapter
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for the embedded databases
    #[serde(default = "default_db_root_path")]
    pub db_root_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_root_path: default_db_root_path(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.db_root_path.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "db_root_path must not be empty".into(),
            )));
        }

        Ok(())
    }
}

fn default_db_root_path() -> String {
    "./data".to_string()
}
