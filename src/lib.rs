//! Change propagation and delivery audit for distributed configuration
//! management.
//!
//! Three cooperating pieces, none of which require a dedicated message
//! broker:
//! - a durable publish/subscribe channel built directly on an ordered,
//!   range-scannable message log ([`ReleaseMessageProducer`] /
//!   [`ReleaseMessageScanner`]);
//! - [`WatchKeyResolver`], mapping a subscriber's identity to the exact set
//!   of topics it must watch, public namespaces included;
//! - [`InstanceAuditor`], a bounded-queue pipeline recording which client
//!   instance received which configuration release, with heavy
//!   deduplication.

mod audit;
mod channel;
mod config;
mod constants;
mod errors;
mod metrics;
mod storage;
mod watch;
pub mod utils;

pub use audit::*;
pub use channel::*;
pub use config::*;
pub use constants::CLUSTER_NAMESPACE_SEPARATOR;
pub use constants::CLUSTER_NAME_DEFAULT;
pub use constants::NAMESPACE_APPLICATION;
pub use constants::NO_APP_ID_PLACEHOLDER;
pub use constants::RELEASE_MESSAGE_CHANNEL;
pub use errors::*;
pub use metrics::*;
pub use storage::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
