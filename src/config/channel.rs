use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Configuration parameters for the release-message channel
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChannelConfig {
    /// Fixed delay between the end of one log scan and the start of the next,
    /// in milliseconds
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,

    /// Maximum number of messages fetched per scan batch. A short batch ends
    /// the current scan cycle.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,

    /// Capacity of the bounded retention-cleanup queue. A full queue drops
    /// cleanup requests without blocking the producer.
    #[serde(default = "default_retention_queue_size")]
    pub retention_queue_size: usize,

    /// Number of superseded messages deleted per retention batch
    #[serde(default = "default_retention_batch_size")]
    pub retention_batch_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: default_scan_interval(),
            scan_batch_size: default_scan_batch_size(),
            retention_queue_size: default_retention_queue_size(),
            retention_batch_size: default_retention_batch_size(),
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scan_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "scan_interval_ms must be at least 1ms".into(),
            )));
        }

        if self.scan_batch_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "scan_batch_size must be greater than 0".into(),
            )));
        }

        if self.retention_queue_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retention_queue_size must be greater than 0".into(),
            )));
        }

        if self.retention_batch_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retention_batch_size must be greater than 0".into(),
            )));
        }

        Ok(())
    }
}

// in ms
fn default_scan_interval() -> u64 {
    1000
}
fn default_scan_batch_size() -> usize {
    500
}
fn default_retention_queue_size() -> usize {
    100
}
fn default_retention_batch_size() -> usize {
    100
}
