//! Namespace-metadata seam consumed by watch-key resolution.

use std::collections::HashSet;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// A namespace declared public by its owning application, subscribable by
/// other applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicNamespace {
    pub name: String,
    pub owner_app_id: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppNamespaceStore: Send + Sync + 'static {
    /// Of the given names, the ones whose declared owner is `app_id`.
    async fn find_owned_by_app(
        &self,
        app_id: &str,
        namespace_names: &HashSet<String>,
    ) -> Result<HashSet<String>>;

    /// Owner lookup for the given names, restricted to public namespaces.
    /// Names with no public declaration are absent from the result.
    async fn find_public_owners(
        &self,
        namespace_names: &HashSet<String>,
    ) -> Result<Vec<PublicNamespace>>;
}
