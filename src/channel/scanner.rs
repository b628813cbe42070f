use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::error;
use tracing::trace;
use tracing::warn;

use crate::constants::RELEASE_MESSAGE_CHANNEL;
use crate::metrics;
use crate::ChannelConfig;
use crate::MessageListener;
use crate::MessageLogStore;
use crate::ReleaseMessage;
use crate::Result;

/// Polls the message log on a fixed delay, advances a monotonic in-memory
/// cursor and fans new messages out to registered listeners.
///
/// The cursor starts at the log head, so a freshly started scanner never
/// replays history; it is not persisted, which is an accepted gap because
/// subscribers reconcile full state on (re)connect. A failed scan leaves the
/// cursor unchanged, so no message is ever skipped (at-least-once).
pub struct ReleaseMessageScanner {
    store: Arc<dyn MessageLogStore>,
    /// Copy-on-write registry: scans read a snapshot, additions swap in a
    /// new list. Listeners added mid-scan see messages from the next scan.
    listeners: ArcSwap<Vec<Arc<dyn MessageListener>>>,
    max_id_scanned: AtomicU64,
    scan_interval_ms: u64,
    scan_batch_size: usize,
    shutdown_signal: watch::Receiver<()>,
}

impl ReleaseMessageScanner {
    pub fn new(
        store: Arc<dyn MessageLogStore>,
        config: &ChannelConfig,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            store,
            listeners: ArcSwap::from_pointee(Vec::new()),
            max_id_scanned: AtomicU64::new(0),
            scan_interval_ms: config.scan_interval_ms,
            scan_batch_size: config.scan_batch_size,
            shutdown_signal,
        }
    }

    /// Registers a listener. Idempotent: adding the same listener twice is a
    /// no-op. Safe to call concurrently with an in-progress scan.
    pub fn add_listener(
        &self,
        listener: Arc<dyn MessageListener>,
    ) {
        self.listeners.rcu(|current| {
            if current.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
                Arc::clone(current)
            } else {
                let mut next = Vec::clone(current);
                next.push(Arc::clone(&listener));
                Arc::new(next)
            }
        });
    }

    /// The last message id delivered to listeners.
    pub fn max_id_scanned(&self) -> u64 {
        self.max_id_scanned.load(Ordering::SeqCst)
    }

    /// Scan loop. The delay is measured between the end of one scan and the
    /// start of the next, independent of how long a scan takes.
    pub async fn run(&self) -> Result<()> {
        let latest = self.store.find_latest_id().await?;
        self.max_id_scanned.store(latest, Ordering::SeqCst);
        trace!("scanner starting from cursor {}", latest);

        let mut shutdown_signal = self.shutdown_signal.clone();
        loop {
            tokio::select! {
                _ = shutdown_signal.changed() => {
                    warn!("[ReleaseMessageScanner] shutdown signal received.");
                    return Ok(());
                }

                _ = tokio::time::sleep(Duration::from_millis(self.scan_interval_ms)) => {
                    // a failed tick leaves the cursor alone; the next tick
                    // retries from the same position
                    if let Err(e) = self.scan().await {
                        error!("scan and send message failed: {:?}", e);
                    }
                }
            }
        }
    }

    /// One tick: keep fetching while full batches come back; a short batch
    /// proves there is currently no more backlog.
    async fn scan(&self) -> Result<()> {
        let listeners = self.listeners.load_full();

        loop {
            let cursor = self.max_id_scanned.load(Ordering::SeqCst);
            let messages = self
                .store
                .find_batch_after(cursor, self.scan_batch_size)
                .await?;
            if messages.is_empty() {
                return Ok(());
            }

            self.fire_message_scanned(&listeners, &messages).await;

            let scanned = messages.len();
            if let Some(last) = messages.last() {
                self.max_id_scanned.store(last.id, Ordering::SeqCst);
            }
            metrics::RELEASE_MESSAGES_SCANNED.inc_by(scanned as u64);

            if scanned < self.scan_batch_size {
                return Ok(());
            }
        }
    }

    /// Delivers messages in id order to every listener. A listener failure
    /// is logged and never stops delivery to the remaining listeners or
    /// messages.
    async fn fire_message_scanned(
        &self,
        listeners: &[Arc<dyn MessageListener>],
        messages: &[ReleaseMessage],
    ) {
        for message in messages {
            for listener in listeners {
                if let Err(e) = listener
                    .handle_message(message, RELEASE_MESSAGE_CHANNEL)
                    .await
                {
                    error!("failed to invoke message listener: {}", e);
                }
            }
        }
    }
}
