//! L2 cache port - shared warm tier
//!
//! The L2 tier is a network-reachable cache shared by every worker instance
//! (a Redis-shaped service in production). The access layer depends only on
//! the [`CacheTier`] port; backends implement it per technology. L2 is an
//! optimization, never a source of truth: the access layer stays correct
//! with this tier entirely unreachable.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use super::entry::CacheEntry;
use crate::error::Result;
use crate::record::Record;

/// Port for a shared, TTL-capable cache tier
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Fetch the cached record, absent on miss or after TTL expiry
    async fn get(&self, key: &str) -> Result<Option<Record>>;

    /// Cache a record under the given TTL, overwriting any previous entry
    async fn put(&self, key: &str, record: Record, ttl: Duration) -> Result<()>;

    /// Remove the entry; must succeed even when the key is absent
    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Drop every entry in this cache's namespace
    async fn clear(&self) -> Result<()>;
}

/// In-memory [`CacheTier`] backend
///
/// Backs tests and single-process deployments. Lock-free concurrent access
/// via `DashMap`, with the same lazy expiry semantics a TTL-capable cache
/// service provides.
#[derive(Default)]
pub struct InMemoryCacheTier {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCacheTier {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held (expired entries not yet observed
    /// by a lookup are counted)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheTier for InMemoryCacheTier {
    async fn get(&self, key: &str) -> Result<Option<Record>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.record().clone()));
        }
        Ok(None)
    }

    async fn put(&self, key: &str, record: Record, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(record, ttl));
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn make_record(key: &str, value: &str) -> Record {
        Record::new(key, Bytes::from(value.to_string()))
    }

    #[tokio::test]
    async fn test_put_get() {
        let tier = InMemoryCacheTier::new();
        tier.put("k1", make_record("k1", "v1"), Duration::from_secs(60))
            .await
            .unwrap();

        let hit = tier.get("k1").await.unwrap().unwrap();
        assert_eq!(hit.value.as_ref(), b"v1");
    }

    #[tokio::test]
    async fn test_miss_on_absent_key() {
        let tier = InMemoryCacheTier::new();
        assert!(tier.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let tier = InMemoryCacheTier::new();
        tier.put("k", make_record("k", "v"), Duration::from_millis(20))
            .await
            .unwrap();
        assert!(tier.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(tier.get("k").await.unwrap().is_none());
        assert!(tier.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_absent_key_succeeds() {
        let tier = InMemoryCacheTier::new();
        tier.invalidate("never-existed").await.unwrap();

        tier.put("k", make_record("k", "v"), Duration::from_secs(60))
            .await
            .unwrap();
        tier.invalidate("k").await.unwrap();
        assert!(tier.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let tier = InMemoryCacheTier::new();
        for i in 0..5 {
            let key = format!("key-{}", i);
            tier.put(&key, make_record(&key, "v"), Duration::from_secs(60))
                .await
                .unwrap();
        }
        assert_eq!(tier.len(), 5);

        tier.clear().await.unwrap();
        assert!(tier.is_empty());
    }
}
