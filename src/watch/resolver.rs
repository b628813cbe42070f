use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::CLUSTER_NAME_DEFAULT;
use crate::constants::CLUSTER_NAMESPACE_SEPARATOR;
use crate::constants::NAMESPACE_APPLICATION;
use crate::constants::NO_APP_ID_PLACEHOLDER;
use crate::AppNamespaceStore;
use crate::Result;

/// Builds a watch key from its (appId, cluster, namespace) scope. The same
/// format is used as the release-message payload, so a release to any scope
/// reaches exactly the subscribers watching that key.
pub fn assemble_watch_key(
    app_id: &str,
    cluster: &str,
    namespace: &str,
) -> String {
    [app_id, cluster, namespace].join(CLUSTER_NAMESPACE_SEPARATOR)
}

/// Computes the set of watch keys a subscriber must register interest in.
///
/// Resolution is pure except for one read-through dependency on namespace
/// metadata, used to find the owning application of namespaces the
/// subscriber does not own ("public" namespaces).
pub struct WatchKeyResolver {
    namespace_store: Arc<dyn AppNamespaceStore>,
}

impl WatchKeyResolver {
    pub fn new(namespace_store: Arc<dyn AppNamespaceStore>) -> Self {
        Self { namespace_store }
    }

    /// Flat watch-key set for a single namespace.
    pub async fn resolve_one(
        &self,
        app_id: &str,
        cluster_name: &str,
        namespace: &str,
        data_center: &str,
    ) -> Result<HashSet<String>> {
        let mut namespaces = HashSet::new();
        namespaces.insert(namespace.to_string());

        let mut watched = self
            .resolve(app_id, cluster_name, &namespaces, data_center)
            .await?;
        Ok(watched.remove(namespace).unwrap_or_default())
    }

    /// Watch keys for every requested namespace, as a multimap keyed by
    /// namespace name.
    ///
    /// Each namespace gets the subscriber's own keys (specific cluster,
    /// data-center cluster, default-cluster fallback). Namespaces owned by a
    /// different application additionally get the owner's keys, so releases
    /// by the public owner propagate to every subscriber.
    pub async fn resolve(
        &self,
        app_id: &str,
        cluster_name: &str,
        namespaces: &HashSet<String>,
        data_center: &str,
    ) -> Result<HashMap<String, HashSet<String>>> {
        // a client with no owning app has nothing to watch
        if app_id.eq_ignore_ascii_case(NO_APP_ID_PLACEHOLDER) {
            return Ok(HashMap::new());
        }

        let mut watched: HashMap<String, HashSet<String>> = namespaces
            .iter()
            .map(|namespace| {
                (
                    namespace.clone(),
                    assemble_watch_keys(app_id, cluster_name, namespace, data_center),
                )
            })
            .collect();

        // Every app owns its 'application' namespace; when that is all that
        // was requested there is nothing to inherit.
        let only_application =
            namespaces.len() == 1 && namespaces.contains(NAMESPACE_APPLICATION);
        if only_application {
            return Ok(watched);
        }

        let owned = self
            .namespace_store
            .find_owned_by_app(app_id, namespaces)
            .await?;
        let candidates: HashSet<String> =
            namespaces.difference(&owned).cloned().collect();
        if candidates.is_empty() {
            return Ok(watched);
        }

        for public in self.namespace_store.find_public_owners(&candidates).await? {
            // stale metadata can report the requester as owner; an app never
            // inherits its own namespace
            if public.owner_app_id == app_id {
                continue;
            }
            let owner_keys = assemble_watch_keys(
                &public.owner_app_id,
                cluster_name,
                &public.name,
                data_center,
            );
            watched.entry(public.name.clone()).or_default().extend(owner_keys);
        }

        Ok(watched)
    }
}

/// The subscriber's own keys for one namespace: a client always falls back
/// to the default cluster, optionally overridden by its own cluster and/or
/// its data-center's cluster, so a release to any of those scopes must
/// reach it.
fn assemble_watch_keys(
    app_id: &str,
    cluster_name: &str,
    namespace: &str,
    data_center: &str,
) -> HashSet<String> {
    if app_id.eq_ignore_ascii_case(NO_APP_ID_PLACEHOLDER) {
        return HashSet::new();
    }

    let mut watched_keys = HashSet::new();

    if cluster_name != CLUSTER_NAME_DEFAULT {
        watched_keys.insert(assemble_watch_key(app_id, cluster_name, namespace));
    }

    if !data_center.is_empty() && data_center != cluster_name {
        watched_keys.insert(assemble_watch_key(app_id, data_center, namespace));
    }

    watched_keys.insert(assemble_watch_key(app_id, CLUSTER_NAME_DEFAULT, namespace));

    watched_keys
}
