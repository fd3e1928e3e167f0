//! Sharded backing store port
//!
//! The store is the durability point: one logical key/value partition per
//! shard, addressed by the shard index the router derives from the key.
//! The access layer depends only on the [`ShardedStore`] port; production
//! backends (a partitioned relational or key/value store) implement it per
//! technology.
//!
//! # Design
//!
//! - Upsert semantics: `created_at` is set on first write and preserved,
//!   `updated_at` refreshes on every write
//! - Each shard owns a bounded connection pool; a permit is held for exactly
//!   one get/put and released when the call returns

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::record::Record;

/// Port for a durable store partitioned into a fixed number of shards
#[async_trait]
pub trait ShardedStore: Send + Sync {
    /// Number of partitions this store serves
    fn num_shards(&self) -> u32;

    /// Read a record from one partition
    async fn get(&self, shard_id: u32, key: &str) -> Result<Option<Record>>;

    /// Upsert a record into one partition, returning the stored record
    async fn put(&self, shard_id: u32, key: &str, value: Bytes) -> Result<Record>;

    /// Number of records held by one partition, for occupancy reporting
    async fn shard_len(&self, shard_id: u32) -> Result<usize>;
}

/// One in-memory partition with its connection pool
struct StoreShard {
    records: DashMap<String, Record>,
    pool: Semaphore,
}

/// In-memory [`ShardedStore`] backend
///
/// Backs tests and single-process deployments with the same contract a
/// partitioned database provides: durable-within-process upserts, bounded
/// per-shard connection pools, store-assigned timestamps.
pub struct InMemoryShardedStore {
    shards: Vec<StoreShard>,
}

impl InMemoryShardedStore {
    /// Create a store with `num_shards` partitions, each with a connection
    /// pool of `pool_size` permits.
    pub fn new(num_shards: u32, pool_size: usize) -> Self {
        let shards = (0..num_shards)
            .map(|_| StoreShard {
                records: DashMap::new(),
                pool: Semaphore::new(pool_size),
            })
            .collect();
        Self { shards }
    }

    fn shard(&self, shard_id: u32) -> Result<&StoreShard> {
        self.shards.get(shard_id as usize).ok_or_else(|| {
            Error::Config(format!(
                "shard {} out of range for {} shards",
                shard_id,
                self.shards.len()
            ))
        })
    }
}

#[async_trait]
impl ShardedStore for InMemoryShardedStore {
    fn num_shards(&self) -> u32 {
        self.shards.len() as u32
    }

    async fn get(&self, shard_id: u32, key: &str) -> Result<Option<Record>> {
        let shard = self.shard(shard_id)?;
        let _permit = shard.pool.acquire().await.map_err(|e| Error::StoreUnavailable {
            shard_id,
            reason: e.to_string(),
        })?;

        Ok(shard.records.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, shard_id: u32, key: &str, value: Bytes) -> Result<Record> {
        let shard = self.shard(shard_id)?;
        let _permit = shard.pool.acquire().await.map_err(|e| Error::WriteFailed {
            shard_id,
            reason: e.to_string(),
        })?;

        let record = match shard.records.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let updated = occupied.get().updated(value);
                occupied.insert(updated.clone());
                updated
            }
            Entry::Vacant(vacant) => {
                let record = Record::new(key, value);
                vacant.insert(record.clone());
                record
            }
        };

        Ok(record)
    }

    async fn shard_len(&self, shard_id: u32) -> Result<usize> {
        Ok(self.shard(shard_id)?.records.len())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn store(num_shards: u32) -> InMemoryShardedStore {
        InMemoryShardedStore::new(num_shards, 4)
    }

    #[tokio::test]
    async fn test_put_get() {
        let store = store(3);
        store.put(1, "user:1", Bytes::from_static(b"Alice")).await.unwrap();

        let record = store.get(1, "user:1").await.unwrap().unwrap();
        assert_eq!(record.value.as_ref(), b"Alice");
    }

    #[tokio::test]
    async fn test_get_miss() {
        let store = store(3);
        assert!(store.get(0, "nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at() {
        let store = store(1);
        let first = store.put(0, "k", Bytes::from_static(b"v1")).await.unwrap();
        let second = store.put(0, "k", Bytes::from_static(b"v2")).await.unwrap();

        assert_eq!(second.value.as_ref(), b"v2");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.shard_len(0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shards_are_isolated() {
        let store = store(2);
        store.put(0, "k", Bytes::from_static(b"v")).await.unwrap();

        assert!(store.get(1, "k").await.unwrap().is_none());
        assert_eq!(store.shard_len(0).await.unwrap(), 1);
        assert_eq!(store.shard_len(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_shard_rejected() {
        let store = store(2);
        assert_matches!(store.get(7, "k").await, Err(Error::Config(_)));
        assert_matches!(
            store.put(7, "k", Bytes::from_static(b"v")).await,
            Err(Error::Config(_))
        );
    }

    #[tokio::test]
    async fn test_concurrent_writes_one_shard() {
        use tokio::task::JoinSet;

        let store = Arc::new(InMemoryShardedStore::new(1, 2));
        let mut join_set = JoinSet::new();

        for i in 0..32 {
            let store = Arc::clone(&store);
            join_set.spawn(async move {
                let key = format!("key-{}", i);
                store.put(0, &key, Bytes::from(format!("v-{}", i))).await
            });
        }

        while let Some(result) = join_set.join_next().await {
            result.unwrap().unwrap();
        }

        assert_eq!(store.shard_len(0).await.unwrap(), 32);
    }
}
