//! Watch-key resolution: maps a subscriber's (appId, cluster, namespaces,
//! dataCenter) identity to the topics it must watch, including namespaces it
//! inherits from public owners.

mod resolver;

pub use resolver::*;
