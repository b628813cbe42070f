//! Client-instance identity and per-namespace delivery records.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CLUSTER_NAMESPACE_SEPARATOR;
use crate::Result;

/// One running client process, identified by (appId, cluster, dataCenter, ip).
/// Created lazily on the first audit event and never updated afterwards; an
/// ip or cluster change produces a new identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: u64,
    pub app_id: String,
    pub cluster_name: String,
    /// Empty-string-normalized; optional in the identity tuple
    pub data_center: String,
    pub ip: String,
}

/// Which configuration release an instance last reported using, unique per
/// `(instance_id, config_app_id, config_namespace_name)`. Mutated in place
/// when a newer release key is observed, or touched to keep
/// `last_modified_time` tracking real usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfigRecord {
    pub instance_id: u64,
    pub config_app_id: String,
    pub config_cluster_name: String,
    pub config_namespace_name: String,
    pub release_key: String,
    /// Epoch millis of the delivery that set the current release key
    pub release_delivery_time: u64,
    pub created_time: u64,
    pub last_modified_time: u64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InstanceStore: Send + Sync + 'static {
    async fn find_instance(
        &self,
        app_id: &str,
        cluster_name: &str,
        data_center: &str,
        ip: &str,
    ) -> Result<Option<Instance>>;

    /// Creates the identity row. A concurrent create of the same tuple fails
    /// with `StorageError::ConstraintViolation`; callers re-read and take the
    /// first writer's row.
    async fn create_instance(
        &self,
        app_id: &str,
        cluster_name: &str,
        data_center: &str,
        ip: &str,
    ) -> Result<Instance>;

    async fn find_instance_config(
        &self,
        instance_id: u64,
        config_app_id: &str,
        config_namespace: &str,
    ) -> Result<Option<InstanceConfigRecord>>;

    /// Creates the record; `StorageError::ConstraintViolation` on a
    /// concurrent create of the same key.
    async fn create_instance_config(
        &self,
        record: &InstanceConfigRecord,
    ) -> Result<()>;

    async fn update_instance_config(
        &self,
        record: &InstanceConfigRecord,
    ) -> Result<()>;
}

/// Cache/storage key for an instance identity: appId+cluster+ip, with the
/// data center appended only when present. Mirrors the unique index on the
/// identity tuple.
pub(crate) fn assemble_instance_key(
    app_id: &str,
    cluster_name: &str,
    ip: &str,
    data_center: &str,
) -> String {
    let mut parts = vec![app_id, cluster_name, ip];
    if !data_center.is_empty() {
        parts.push(data_center);
    }
    parts.join(CLUSTER_NAMESPACE_SEPARATOR)
}

/// Cache/storage key for an instance-config record: the unique
/// (instanceId, configAppId, configNamespace) triple.
pub(crate) fn assemble_instance_config_key(
    instance_id: u64,
    config_app_id: &str,
    config_namespace: &str,
) -> String {
    [
        instance_id.to_string().as_str(),
        config_app_id,
        config_namespace,
    ]
    .join(CLUSTER_NAMESPACE_SEPARATOR)
}
