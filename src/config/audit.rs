use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Configuration parameters for the delivery-audit pipeline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditConfig {
    /// Capacity of the bounded audit-event queue. `record` drops events
    /// without blocking once the queue is full.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Maximum entries in the instance-identity cache
    #[serde(default = "default_instance_cache_capacity")]
    pub instance_cache_capacity: usize,

    /// Instance-identity cache entry lifetime since last access, in seconds
    #[serde(default = "default_instance_cache_ttl")]
    pub instance_cache_ttl_secs: u64,

    /// Maximum entries in the release-key cache
    #[serde(default = "default_release_key_cache_capacity")]
    pub release_key_cache_capacity: usize,

    /// Release-key cache entry lifetime since write, in seconds
    #[serde(default = "default_release_key_cache_ttl")]
    pub release_key_cache_ttl_secs: u64,

    /// Window within which a repeated delivery report for an unchanged
    /// release key skips the storage write, in milliseconds
    #[serde(default = "default_write_debounce")]
    pub write_debounce_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            instance_cache_capacity: default_instance_cache_capacity(),
            instance_cache_ttl_secs: default_instance_cache_ttl(),
            release_key_cache_capacity: default_release_key_cache_capacity(),
            release_key_cache_ttl_secs: default_release_key_cache_ttl(),
            write_debounce_ms: default_write_debounce(),
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<()> {
        if self.queue_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "queue_size must be greater than 0".into(),
            )));
        }

        if self.instance_cache_capacity == 0 || self.release_key_cache_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache capacities must be greater than 0".into(),
            )));
        }

        if self.instance_cache_ttl_secs == 0 || self.release_key_cache_ttl_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache TTLs must be greater than 0".into(),
            )));
        }

        Ok(())
    }
}

fn default_queue_size() -> usize {
    10_000
}
fn default_instance_cache_capacity() -> usize {
    50_000
}
// 1 hour since last access
fn default_instance_cache_ttl() -> u64 {
    3600
}
fn default_release_key_cache_capacity() -> usize {
    50_000
}
// 1 day since write
fn default_release_key_cache_ttl() -> u64 {
    86_400
}
// 10 minutes; reduces duplicate writes when a client hits two serving
// nodes in quick succession
fn default_write_debounce() -> u64 {
    600_000
}
