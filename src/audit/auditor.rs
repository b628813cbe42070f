use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::error;
use tracing::trace;
use tracing::warn;

use super::AuditEvent;
use super::ExpiringCache;
use crate::metrics;
use crate::storage::assemble_instance_config_key;
use crate::storage::assemble_instance_key;
use crate::AuditConfig;
use crate::Error;
use crate::InstanceConfigRecord;
use crate::InstanceStore;
use crate::Result;
use crate::StorageError;

/// Accepts delivery observations without ever blocking the serving path.
pub struct InstanceAuditor {
    audit_tx: mpsc::Sender<AuditEvent>,
}

impl InstanceAuditor {
    /// Builds the auditor together with its single worker. The worker must
    /// be spawned by the caller; the pair shares the bounded event queue.
    pub fn new(
        store: Arc<dyn InstanceStore>,
        config: &AuditConfig,
        shutdown_signal: watch::Receiver<()>,
    ) -> (Self, AuditWorker) {
        let (audit_tx, audit_rx) = mpsc::channel(config.queue_size);
        let auditor = Self { audit_tx };
        let worker = AuditWorker {
            store,
            audit_rx,
            instance_cache: ExpiringCache::expire_after_access(
                config.instance_cache_capacity,
                Duration::from_secs(config.instance_cache_ttl_secs),
            ),
            release_key_cache: ExpiringCache::expire_after_write(
                config.release_key_cache_capacity,
                Duration::from_secs(config.release_key_cache_ttl_secs),
            ),
            write_debounce_ms: config.write_debounce_ms,
            shutdown_signal,
        };
        (auditor, worker)
    }

    /// Queues one delivery observation. Returns `false` and drops the event
    /// when the queue is full; never blocks.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        app_id: &str,
        cluster_name: &str,
        data_center: &str,
        ip: &str,
        config_app_id: &str,
        config_cluster_name: &str,
        config_namespace: &str,
        release_key: &str,
    ) -> bool {
        let event = AuditEvent::new(
            app_id,
            cluster_name,
            data_center,
            ip,
            config_app_id,
            config_cluster_name,
            config_namespace,
            release_key,
        );

        match self.audit_tx.try_send(event) {
            Ok(()) => {
                metrics::AUDIT_EVENTS_ACCEPTED.inc();
                true
            }
            Err(_) => {
                trace!("audit queue full, dropping delivery event");
                metrics::AUDIT_EVENTS_DROPPED.inc();
                false
            }
        }
    }
}

/// Single consumer of the audit queue. Processes events in submission
/// order; both caches are touched only from this worker.
pub struct AuditWorker {
    store: Arc<dyn InstanceStore>,
    audit_rx: mpsc::Receiver<AuditEvent>,
    /// identity tuple -> instance id
    instance_cache: ExpiringCache<u64>,
    /// (instance, configApp, configNamespace) -> last seen release key
    release_key_cache: ExpiringCache<String>,
    write_debounce_ms: u64,
    shutdown_signal: watch::Receiver<()>,
}

impl AuditWorker {
    pub async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                _ = self.shutdown_signal.changed() => {
                    warn!("[AuditWorker] shutdown signal received.");
                    return Ok(());
                }

                maybe_event = self.audit_rx.recv() => {
                    match maybe_event {
                        Some(event) => {
                            // failures drop the event, never the worker; no
                            // retry (at-most-once audit)
                            if let Err(e) = self.audit(&event).await {
                                error!("audit of instance {} failed: {:?}", event.ip, e);
                            }
                        }
                        // auditor dropped; queue fully drained
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    pub(crate) async fn audit(
        &self,
        event: &AuditEvent,
    ) -> Result<()> {
        let instance_id = self.resolve_instance_id(event).await?;

        let config_key = assemble_instance_config_key(
            instance_id,
            &event.config_app_id,
            &event.config_namespace,
        );
        // Dominant steady-state case: the instance keeps reporting the
        // release key we already recorded.
        if let Some(cached_release_key) = self.release_key_cache.get(&config_key) {
            if cached_release_key == event.release_key {
                return Ok(());
            }
        }
        self.release_key_cache
            .insert(config_key, event.release_key.clone());

        match self
            .store
            .find_instance_config(instance_id, &event.config_app_id, &event.config_namespace)
            .await?
        {
            Some(mut existing) => {
                if existing.release_key != event.release_key {
                    existing.config_cluster_name = event.config_cluster_name.clone();
                    existing.release_key = event.release_key.clone();
                    existing.release_delivery_time = event.offered_at;
                } else if self.close_enough(event.offered_at, existing.last_modified_time) {
                    // the same delivery was reported moments ago, likely via
                    // another serving node
                    return Ok(());
                }

                // write even when the release key is unchanged, so the
                // record's freshness reflects real usage
                existing.last_modified_time = event.offered_at;
                self.store.update_instance_config(&existing).await?;
                metrics::AUDIT_RECORDS_WRITTEN.inc();
            }
            None => {
                let record = InstanceConfigRecord {
                    instance_id,
                    config_app_id: event.config_app_id.clone(),
                    config_cluster_name: event.config_cluster_name.clone(),
                    config_namespace_name: event.config_namespace.clone(),
                    release_key: event.release_key.clone(),
                    release_delivery_time: event.offered_at,
                    created_time: event.offered_at,
                    last_modified_time: event.offered_at,
                };
                match self.store.create_instance_config(&record).await {
                    Ok(()) => metrics::AUDIT_RECORDS_WRITTEN.inc(),
                    // concurrent insertion, safe to ignore
                    Err(e) if e.is_constraint_violation() => {}
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    async fn resolve_instance_id(
        &self,
        event: &AuditEvent,
    ) -> Result<u64> {
        let instance_key = assemble_instance_key(
            &event.app_id,
            &event.cluster_name,
            &event.ip,
            &event.data_center,
        );
        if let Some(instance_id) = self.instance_cache.get(&instance_key) {
            return Ok(instance_id);
        }

        let instance_id = self.find_or_create_instance(event).await?;
        self.instance_cache.insert(instance_key, instance_id);
        Ok(instance_id)
    }

    async fn find_or_create_instance(
        &self,
        event: &AuditEvent,
    ) -> Result<u64> {
        if let Some(existing) = self
            .store
            .find_instance(&event.app_id, &event.cluster_name, &event.data_center, &event.ip)
            .await?
        {
            return Ok(existing.id);
        }

        match self
            .store
            .create_instance(&event.app_id, &event.cluster_name, &event.data_center, &event.ip)
            .await
        {
            Ok(created) => Ok(created.id),
            Err(e) if e.is_constraint_violation() => {
                // lost the create race; the first writer's row wins
                self.store
                    .find_instance(&event.app_id, &event.cluster_name, &event.data_center, &event.ip)
                    .await?
                    .map(|instance| instance.id)
                    .ok_or_else(|| {
                        Error::Storage(StorageError::Persistence(
                            "instance missing after constraint violation".to_string(),
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    fn close_enough(
        &self,
        offered_at: u64,
        last_modified_time: u64,
    ) -> bool {
        offered_at.saturating_sub(last_modified_time) < self.write_debounce_ms
    }
}
