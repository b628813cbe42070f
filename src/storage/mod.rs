//! Storage seams consumed by the change-propagation core.
//!
//! The core holds no long-lived references into storage; every trait call
//! returns short-lived query results. Implementations must tolerate
//! concurrent writers from multiple processes: all create-or-find paths are
//! race-safe via unique-constraint-then-re-read, never application locking.

mod app_namespace;
mod instance;
mod message_log;
mod sled_adapter;

use std::path::Path;

#[doc(hidden)]
pub use app_namespace::*;
#[doc(hidden)]
pub use instance::*;
#[doc(hidden)]
pub use message_log::*;
#[doc(hidden)]
pub use sled_adapter::*;
use tracing::debug;
use tracing::warn;

/// (message_log_db, instance_db)
pub fn init_sled_storages(
    sled_db_root_path: impl AsRef<Path> + std::fmt::Debug
) -> std::result::Result<(sled::Db, sled::Db), std::io::Error> {
    debug!("init_sled_storages from path: {:?}", &sled_db_root_path);

    Ok((
        init_sled_message_log_db(&sled_db_root_path)?,
        init_sled_instance_db(&sled_db_root_path)?,
    ))
}

pub fn init_sled_message_log_db(
    sled_db_root_path: impl AsRef<Path> + std::fmt::Debug
) -> std::result::Result<sled::Db, std::io::Error> {
    debug!("init_sled_message_log_db from path: {:?}", &sled_db_root_path);

    let path = sled_db_root_path.as_ref();
    let message_log_db_path = path.join("message_log");

    sled::Config::default()
        .path(&message_log_db_path)
        .cache_capacity(10 * 1024 * 1024) //10MB
        .flush_every_ms(Some(3))
        .use_compression(true)
        .compression_factor(1)
        .open()
        .map_err(|e| {
            warn!(
                "Try to open DB at this location: {:?} and failed: {:?}",
                message_log_db_path, e
            );
            std::io::Error::other(e)
        })
}

pub fn init_sled_instance_db(
    sled_db_root_path: impl AsRef<Path> + std::fmt::Debug
) -> std::result::Result<sled::Db, std::io::Error> {
    debug!("init_sled_instance_db from path: {:?}", &sled_db_root_path);

    let path = sled_db_root_path.as_ref();
    let instance_db_path = path.join("instances");

    sled::Config::default()
        .path(&instance_db_path)
        .cache_capacity(10 * 1024 * 1024) //10MB
        .flush_every_ms(Some(3))
        .use_compression(true)
        .compression_factor(1)
        .open()
        .map_err(|e| {
            warn!(
                "Try to open DB at this location: {:?} and failed: {:?}",
                instance_db_path, e
            );
            std::io::Error::other(e)
        })
}
