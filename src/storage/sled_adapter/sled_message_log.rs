use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use crate::constants::RELEASE_MESSAGE_TREE;
use crate::utils::convert::id_to_key;
use crate::utils::convert::key_to_id;
use crate::MessageLogStore;
use crate::ReleaseMessage;
use crate::Result;

/// Message log on a sled tree. Rows are keyed by big-endian id so range
/// scans iterate in ascending id order; `delete_batch` removes physically.
pub struct SledMessageLog {
    db: sled::Db,
    tree: sled::Tree,
    /// Keeps id assignment and append under one guard so ids match
    /// insertion order.
    insert_lock: Mutex<()>,
}

impl SledMessageLog {
    pub fn new(db: sled::Db) -> Result<Self> {
        let tree = db.open_tree(RELEASE_MESSAGE_TREE)?;
        Ok(Self {
            db,
            tree,
            insert_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl MessageLogStore for SledMessageLog {
    async fn insert(
        &self,
        channel: &str,
        payload: &str,
    ) -> Result<ReleaseMessage> {
        let _guard = self.insert_lock.lock();

        // ids start at 1; 0 is the empty-log sentinel
        let id = self.db.generate_id()? + 1;
        let message = ReleaseMessage {
            id,
            channel: channel.to_string(),
            payload: payload.to_string(),
            created_at: crate::utils::time::now_millis(),
        };
        let bytes = bincode::serialize(&message)?;
        self.tree.insert(id_to_key(id), bytes)?;

        trace!("inserted release message {} on {}", id, channel);
        Ok(message)
    }

    async fn find_by_id(
        &self,
        id: u64,
    ) -> Result<Option<ReleaseMessage>> {
        match self.tree.get(id_to_key(id))? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    async fn find_batch_after(
        &self,
        after_id: u64,
        limit: usize,
    ) -> Result<Vec<ReleaseMessage>> {
        let start = id_to_key(after_id.saturating_add(1));
        let mut messages = Vec::new();

        for entry in self.tree.range(start..) {
            if messages.len() >= limit {
                break;
            }
            let (_, value) = entry?;
            messages.push(bincode::deserialize::<ReleaseMessage>(&value)?);
        }

        Ok(messages)
    }

    async fn find_latest_id(&self) -> Result<u64> {
        match self.tree.last()? {
            Some((key, _)) => Ok(key_to_id(&key)?),
            None => Ok(0),
        }
    }

    async fn delete_batch(
        &self,
        payload: &str,
        id_less_than: u64,
        limit: usize,
    ) -> Result<Vec<ReleaseMessage>> {
        let mut removed = Vec::new();

        for entry in self.tree.range(..id_to_key(id_less_than)) {
            if removed.len() >= limit {
                break;
            }
            let (key, value) = entry?;
            let message: ReleaseMessage = bincode::deserialize(&value)?;
            if message.payload != payload {
                continue;
            }
            self.tree.remove(key)?;
            removed.push(message);
        }

        Ok(removed)
    }
}
