//! Configuration management for the change-propagation core.
//!
//! Provides hierarchical configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Main config file
//! 3. Local overrides
//! 4. Environment variables (highest priority)
//!
//! All tuning knobs here (batch sizes, debounce windows, cache bounds) are
//! policy, not correctness-critical; the defaults match the values the
//! components were sized for in production.

mod audit;
mod channel;
mod storage;

pub use audit::*;
pub use channel::*;
pub use storage::*;


//---
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Release-message channel parameters (producer, retention, scanner)
    #[serde(default)]
    pub channel: ChannelConfig,
    /// Delivery-audit pipeline parameters (queue, caches, debounce)
    #[serde(default)]
    pub audit: AuditConfig,
    /// Embedded storage adapter settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Settings {
    /// Load configuration from multiple sources with priority:
    /// 1. Main config file (optional path)
    /// 2. Local overrides
    /// 3. Environment variables
    ///
    /// # Arguments
    /// * `config_path` - Optional path to the main configuration file
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder();

        // 1. Main config
        if let Some(path) = config_path {
            config = config.add_source(File::with_name(path).required(true));
        }

        // 2. Local overrides
        config = config.add_source(File::with_name("config/local").required(false));

        // 3. Environment variables (highest priority)
        config = config.add_source(
            Environment::with_prefix("CONFLUX")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = config.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates all subsystem configurations
    pub fn validate(&self) -> Result<()> {
        self.channel.validate()?;
        self.audit.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
