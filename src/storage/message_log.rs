//! Core model: the append-only release-message log.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// One row of the release-message log. Immutable once written; the id is
/// assigned by the log and strictly increases with insertion order. Two
/// messages carrying the same `payload` describe the same logical topic
/// update, which is what retention cleanup deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMessage {
    pub id: u64,
    pub channel: String,
    /// The watch key of the released scope; doubles as the pub/sub topic.
    pub payload: String,
    /// Epoch millis at insert time
    pub created_at: u64,
}

/// Append-only, auto-incrementing-id log of release messages.
///
/// Maps to any ordered, appendable, range-scannable store: a relational
/// table, an embedded log, or an ordered key-value range. Soft-deleting
/// implementations must hide tombstoned rows from every read operation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageLogStore: Send + Sync + 'static {
    /// Appends a message and returns the stored row with its assigned id.
    async fn insert(
        &self,
        channel: &str,
        payload: &str,
    ) -> Result<ReleaseMessage>;

    async fn find_by_id(
        &self,
        id: u64,
    ) -> Result<Option<ReleaseMessage>>;

    /// Up to `limit` messages with `id > after_id`, ascending by id.
    async fn find_batch_after(
        &self,
        after_id: u64,
        limit: usize,
    ) -> Result<Vec<ReleaseMessage>>;

    /// The current largest id, or 0 when the log is empty.
    async fn find_latest_id(&self) -> Result<u64>;

    /// Deletes up to `limit` messages with the given payload and
    /// `id < id_less_than`, returning the removed rows.
    async fn delete_batch(
        &self,
        payload: &str,
        id_less_than: u64,
        limit: usize,
    ) -> Result<Vec<ReleaseMessage>>;
}
