//! The database-backed release-message channel.
//!
//! No dedicated broker: producers append to the ordered message log, and
//! every serving node runs its own scanner that polls the log, advances an
//! in-memory cursor and fans new messages out to registered listeners.
//! Delivery is at-least-once; listeners are required to be idempotent per
//! topic.

mod listener;
mod producer;
mod scanner;

pub use listener::*;
pub use producer::*;
pub use scanner::*;

#[cfg(test)]
mod producer_test;
