// -
// Channel names

/// The only channel release messages are published on. Producers reject other
/// channel names; scanners hand it to every listener invocation.
pub const RELEASE_MESSAGE_CHANNEL: &str = "conflux-release";

// -
// Watch key composition

/// Separator between the appId / cluster / namespace segments of a watch key.
/// Watch keys share their format with the release-message payload.
pub const CLUSTER_NAMESPACE_SEPARATOR: &str = "+";

/// Cluster every client falls back to when no specific cluster matches.
pub const CLUSTER_NAME_DEFAULT: &str = "default";

/// The namespace every application owns implicitly. Never treated as public.
pub const NAMESPACE_APPLICATION: &str = "application";

/// Sentinel appId for clients that declared no owning application.
/// Compared case-insensitively.
pub const NO_APP_ID_PLACEHOLDER: &str = "ConfluxNoAppIdPlaceHolder";

// -
// Sled tree namespaces

pub(crate) const RELEASE_MESSAGE_TREE: &str = "_release_messages";
pub(crate) const INSTANCE_TREE: &str = "_instances";
pub(crate) const INSTANCE_CONFIG_TREE: &str = "_instance_configs";
