use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::constants::RELEASE_MESSAGE_CHANNEL;
use crate::metrics;
use crate::ChannelConfig;
use crate::MessageLogStore;
use crate::Result;

/// Appends release messages to the log and hands their ids to the retention
/// worker for best-effort cleanup of superseded messages.
pub struct ReleaseMessageProducer {
    store: Arc<dyn MessageLogStore>,
    retention_tx: mpsc::Sender<u64>,
}

impl ReleaseMessageProducer {
    /// Builds the producer together with its retention worker. The worker
    /// must be spawned by the caller; the pair shares the bounded cleanup
    /// queue.
    pub fn new(
        store: Arc<dyn MessageLogStore>,
        config: &ChannelConfig,
        shutdown_signal: watch::Receiver<()>,
    ) -> (Self, RetentionWorker) {
        let (retention_tx, retention_rx) = mpsc::channel(config.retention_queue_size);
        let producer = Self {
            store: store.clone(),
            retention_tx,
        };
        let worker = RetentionWorker {
            store,
            retention_rx,
            batch_size: config.retention_batch_size,
            shutdown_signal,
        };
        (producer, worker)
    }

    /// Appends `message` (a watch key) to the log. A storage failure
    /// surfaces to the caller: the release must not be reported as sent when
    /// subscribers cannot see it.
    ///
    /// Only the fixed release channel is supported; other channel names are
    /// ignored with a warning.
    pub async fn send(
        &self,
        message: &str,
        channel: &str,
    ) -> Result<()> {
        info!("sending message {} to channel {}", message, channel);
        if channel != RELEASE_MESSAGE_CHANNEL {
            warn!("channel {} not supported by the release message producer", channel);
            return Ok(());
        }

        let saved = self.store.insert(channel, message).await?;
        metrics::RELEASE_MESSAGES_SENT.inc();

        // Retention is best-effort: a full queue drops the id rather than
        // blocking the release path.
        if self.retention_tx.try_send(saved.id).is_err() {
            trace!("retention queue full, skipping cleanup for message {}", saved.id);
        }

        Ok(())
    }
}

/// Single background worker draining the retention queue. For each id it
/// re-reads the message, then deletes older messages with the same payload
/// in batches until a short batch proves there are no more.
pub struct RetentionWorker {
    store: Arc<dyn MessageLogStore>,
    retention_rx: mpsc::Receiver<u64>,
    batch_size: usize,
    shutdown_signal: watch::Receiver<()>,
}

impl RetentionWorker {
    pub async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                _ = self.shutdown_signal.changed() => {
                    warn!("[RetentionWorker] shutdown signal received.");
                    return Ok(());
                }

                maybe_id = self.retention_rx.recv() => {
                    match maybe_id {
                        Some(id) => {
                            if let Err(e) = self.clean(id).await {
                                error!("retention cleanup for message {} failed: {:?}", id, e);
                            }
                        }
                        // producer dropped; nothing left to clean
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    async fn clean(
        &self,
        id: u64,
    ) -> Result<()> {
        // Double check the message still exists: the insert may have been
        // rolled back, and other processes run their own cleanup.
        let Some(message) = self.store.find_by_id(id).await? else {
            return Ok(());
        };

        loop {
            let removed = self
                .store
                .delete_batch(&message.payload, message.id, self.batch_size)
                .await?;
            metrics::RETENTION_MESSAGES_DELETED.inc_by(removed.len() as u64);

            for old in &removed {
                debug!("cleaned superseded release message {} ({})", old.id, old.payload);
            }
            // a short batch means no more superseded messages remain
            if removed.len() < self.batch_size {
                return Ok(());
            }
        }
    }
}
