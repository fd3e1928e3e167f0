//! L1 cache - in-process hot tier
//!
//! Lowest-latency cache, local to one worker instance. Bounded by entry
//! count with LRU eviction, bounded in freshness by a TTL. Entries are
//! owned exclusively by this instance; there is no cross-instance sharing,
//! so a write on another instance leaves this L1 stale until TTL expiry.
//!
//! # Design
//!
//! - Map plus recency deque guarded by a single `parking_lot::Mutex`;
//!   `get`/`put`/`invalidate` linearize with respect to each other
//! - No I/O of any kind under the lock
//! - Lazy expiry on lookup, LRU eviction on insert at capacity

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;

use super::entry::CacheEntry;
use crate::record::Record;

struct L1Inner {
    map: HashMap<String, CacheEntry>,
    /// Recency order, least-recently-used at the front
    order: VecDeque<String>,
}

impl L1Inner {
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }

    fn forget(&mut self, key: &str) {
        self.map.remove(key);
        self.order.retain(|k| k != key);
    }
}

/// In-process LRU cache with per-entry TTL
pub struct L1Cache {
    inner: Mutex<L1Inner>,
    max_entries: usize,
    ttl: Duration,
}

impl L1Cache {
    /// Create a cache bounded to `max_entries` with the given freshness
    /// window. Both are fixed for the cache's lifetime.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(L1Inner {
                map: HashMap::with_capacity(max_entries),
                order: VecDeque::with_capacity(max_entries),
            }),
            max_entries,
            ttl,
        }
    }

    /// Get the cached record if present and unexpired.
    ///
    /// A hit refreshes the entry's recency; an expired entry is removed and
    /// reported absent.
    pub fn get(&self, key: &str) -> Option<Record> {
        let mut inner = self.inner.lock();

        let live = match inner.map.get(key) {
            Some(entry) if entry.is_expired() => None,
            Some(entry) => Some(entry.record().clone()),
            None => return None,
        };

        match live {
            Some(record) => {
                inner.touch(key);
                Some(record)
            }
            None => {
                inner.forget(key);
                None
            }
        }
    }

    /// Insert or overwrite a record, evicting the least-recently-used entry
    /// when at capacity.
    pub fn put(&self, record: Record) {
        let key = record.key.clone();
        let entry = CacheEntry::new(record, self.ttl);
        let mut inner = self.inner.lock();

        if inner.map.contains_key(&key) {
            inner.map.insert(key.clone(), entry);
            inner.touch(&key);
            return;
        }

        while inner.map.len() >= self.max_entries {
            match inner.order.pop_front() {
                Some(victim) => {
                    inner.map.remove(&victim);
                }
                None => break,
            }
        }

        inner.map.insert(key.clone(), entry);
        inner.order.push_back(key);
    }

    /// Remove the entry if present; absent keys are a no-op, not an error.
    pub fn invalidate(&self, key: &str) {
        let mut inner = self.inner.lock();
        inner.forget(key);
    }

    /// Number of entries currently held (expired entries not yet observed
    /// by a lookup are counted)
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        inner.order.clear();
    }

    /// Get the capacity bound
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Get the freshness window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

// =============================================================================
// Tests
// =============================================================================
