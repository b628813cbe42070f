use crate::utils::time::now_millis;

/// One "instance delivered config" observation, queued by `record` and
/// consumed by the audit worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub app_id: String,
    pub cluster_name: String,
    /// Empty-string-normalized
    pub data_center: String,
    pub ip: String,
    pub config_app_id: String,
    pub config_cluster_name: String,
    pub config_namespace: String,
    pub release_key: String,
    /// Epoch millis at enqueue time; the debounce window compares against
    /// this, not the processing time.
    pub offered_at: u64,
}

impl AuditEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        app_id: &str,
        cluster_name: &str,
        data_center: &str,
        ip: &str,
        config_app_id: &str,
        config_cluster_name: &str,
        config_namespace: &str,
        release_key: &str,
    ) -> Self {
        Self {
            app_id: app_id.to_string(),
            cluster_name: cluster_name.to_string(),
            data_center: data_center.to_string(),
            ip: ip.to_string(),
            config_app_id: config_app_id.to_string(),
            config_cluster_name: config_cluster_name.to_string(),
            config_namespace: config_namespace.to_string(),
            release_key: release_key.to_string(),
            offered_at: now_millis(),
        }
    }
}
