use std::time::Duration;

use dashmap::DashMap;
// virtual-time aware; equals the std clock outside paused test runtimes
use tokio::time::Instant;

/// Which timestamp an entry's lifetime is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpiryPolicy {
    /// Entry expires `ttl` after its last read or write
    AfterAccess,
    /// Entry expires `ttl` after it was last written, regardless of reads
    AfterWrite,
}

struct CacheEntry<V> {
    value: V,
    written_at: Instant,
    last_accessed: Instant,
}

/// Bounded TTL cache. At capacity the entry with the oldest policy-relevant
/// timestamp is evicted; exact eviction order is not a correctness
/// requirement, only the TTL and size bounds.
///
/// Mutated only by the audit worker, but DashMap keeps reads safe for
/// anyone holding a shared reference.
pub(crate) struct ExpiringCache<V: Clone> {
    entries: DashMap<String, CacheEntry<V>>,
    capacity: usize,
    ttl: Duration,
    policy: ExpiryPolicy,
}

impl<V: Clone> ExpiringCache<V> {
    pub(crate) fn expire_after_access(
        capacity: usize,
        ttl: Duration,
    ) -> Self {
        Self::new(capacity, ttl, ExpiryPolicy::AfterAccess)
    }

    pub(crate) fn expire_after_write(
        capacity: usize,
        ttl: Duration,
    ) -> Self {
        Self::new(capacity, ttl, ExpiryPolicy::AfterWrite)
    }

    fn new(
        capacity: usize,
        ttl: Duration,
        policy: ExpiryPolicy,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            ttl,
            policy,
        }
    }

    pub(crate) fn get(
        &self,
        key: &str,
    ) -> Option<V> {
        let expired = {
            let mut entry = self.entries.get_mut(key)?;
            if self.is_expired(&entry) {
                true
            } else {
                entry.last_accessed = Instant::now();
                return Some(entry.value.clone());
            }
        };
        // guard dropped before touching the shard again
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub(crate) fn insert(
        &self,
        key: String,
        value: V,
    ) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_oldest();
        }

        let now = Instant::now();
        self.entries.insert(
            key,
            CacheEntry {
                value,
                written_at: now,
                last_accessed: now,
            },
        );
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_expired(
        &self,
        entry: &CacheEntry<V>,
    ) -> bool {
        let reference = match self.policy {
            ExpiryPolicy::AfterAccess => entry.last_accessed,
            ExpiryPolicy::AfterWrite => entry.written_at,
        };
        reference.elapsed() > self.ttl
    }

    fn evict_oldest(&self) {
        let mut oldest_key: Option<String> = None;
        let mut oldest_time = Instant::now();

        for entry in self.entries.iter() {
            let reference = match self.policy {
                ExpiryPolicy::AfterAccess => entry.last_accessed,
                ExpiryPolicy::AfterWrite => entry.written_at,
            };
            if reference < oldest_time {
                oldest_time = reference;
                oldest_key = Some(entry.key().clone());
            }
        }

        if let Some(key) = oldest_key {
            self.entries.remove(&key);
        }
    }
}
