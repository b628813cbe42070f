//! Embedded default implementations of the storage seams, mapping the
//! message-log and instance contracts onto sled's ordered key space.

mod sled_instance_store;
mod sled_message_log;

pub use sled_instance_store::*;
pub use sled_message_log::*;

#[cfg(test)]
mod sled_instance_store_test;
