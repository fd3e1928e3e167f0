//! Cache-aside access layer
//!
//! Orchestrates reads through L1 → L2 → sharded store, promoting values
//! upward on each miss resolved by a lower tier, and writes through to the
//! store followed by cache invalidation.
//!
//! ```text
//! read:  L1 ──miss──▶ L2 ──miss──▶ router ──▶ store shard
//!         ▲            ▲                          │
//!         └── promote ─┴───────── populate ───────┘
//!
//! write: router ──▶ store shard (durability point)
//!                       │
//!                       └──▶ invalidate L1, then L2
//! ```
//!
//! The store is the only tier with a durability guarantee. Cache failures
//! below it are absorbed: logged, counted, and treated as misses. Store
//! failures always surface to the caller.

use std::sync::Arc;

use bytes::Bytes;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::{CacheTier, L1Cache};
use crate::config::AccessConfig;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::router::ShardRouter;
use crate::stats::{AccessStats, StatsSnapshot};
use crate::store::ShardedStore;

/// Which tier served a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// In-process cache
    L1,
    /// Shared cache
    L2,
    /// Authoritative store
    Store,
}

impl std::fmt::Display for ReadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadSource::L1 => write!(f, "L1"),
            ReadSource::L2 => write!(f, "L2"),
            ReadSource::Store => write!(f, "STORE"),
        }
    }
}

/// A successful read and the tier that served it
#[derive(Debug, Clone)]
pub struct ReadHit {
    pub record: Record,
    pub source: ReadSource,
}

/// Acknowledgement of a durable write
#[derive(Debug, Clone)]
pub struct WriteReceipt {
    /// Partition the key routed to
    pub shard_id: u32,
    /// The record as stored
    pub record: Record,
}

/// Tiered cache-aside access layer
pub struct AccessLayer {
    config: AccessConfig,
    router: ShardRouter,
    l1: L1Cache,
    l2: Arc<dyn CacheTier>,
    store: Arc<dyn ShardedStore>,
    stats: Arc<AccessStats>,
}

impl std::fmt::Debug for AccessLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessLayer")
            .field("config", &self.config)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl AccessLayer {
    /// Create an access layer over the given L2 cache and sharded store,
    /// with a fresh statistics recorder.
    pub fn new(
        config: AccessConfig,
        l2: Arc<dyn CacheTier>,
        store: Arc<dyn ShardedStore>,
    ) -> Result<Self> {
        Self::with_stats(config, l2, store, Arc::new(AccessStats::new()))
    }

    /// Create an access layer with an injected statistics recorder.
    pub fn with_stats(
        config: AccessConfig,
        l2: Arc<dyn CacheTier>,
        store: Arc<dyn ShardedStore>,
        stats: Arc<AccessStats>,
    ) -> Result<Self> {
        config.validate()?;
        if store.num_shards() != config.num_shards {
            return Err(Error::Config(format!(
                "store serves {} shards but config expects {}",
                store.num_shards(),
                config.num_shards
            )));
        }

        let router = ShardRouter::new(config.num_shards)?;
        let l1 = L1Cache::new(config.l1_max_entries, config.l1_ttl);

        Ok(Self {
            config,
            router,
            l1,
            l2,
            store,
            stats,
        })
    }

    /// Read a record, probing L1, then L2, then the key's store shard.
    ///
    /// `Ok(None)` means the key is absent everywhere; neither cache tier is
    /// populated in that case, so a later write is never masked by a
    /// negative entry. A store failure after both cache misses surfaces as
    /// [`Error::StoreUnavailable`].
    pub async fn read(&self, key: &str) -> Result<Option<ReadHit>> {
        validate_key(key)?;

        if let Some(record) = self.l1.get(key) {
            self.stats.record_l1_hit();
            return Ok(Some(ReadHit {
                record,
                source: ReadSource::L1,
            }));
        }
        self.stats.record_l1_miss();

        if let Some(record) = self.l2_get(key).await {
            self.stats.record_l2_hit();
            // Promote into L1 so the next read stays in-process
            self.l1.put(record.clone());
            return Ok(Some(ReadHit {
                record,
                source: ReadSource::L2,
            }));
        }
        self.stats.record_l2_miss();

        let shard_id = self.router.route(key);
        let found = match timeout(self.config.store_timeout, self.store.get(shard_id, key)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::StoreUnavailable {
                    shard_id,
                    reason: format!("read timed out after {:?}", self.config.store_timeout),
                })
            }
        };

        match found {
            Some(record) => {
                self.stats.record_store_read();
                // Populate lower tier first: promotion flows store → L2 → L1
                self.l2_put(key, record.clone()).await;
                self.l1.put(record.clone());
                Ok(Some(ReadHit {
                    record,
                    source: ReadSource::Store,
                }))
            }
            None => Ok(None),
        }
    }

    /// Write a record through to its shard, then invalidate both cache
    /// tiers for the key.
    ///
    /// The store write is the durability point: the call returns only after
    /// the store confirms the upsert, and a store failure surfaces as
    /// [`Error::WriteFailed`] with no cache mutation. Invalidation failures
    /// are logged and swallowed; stale cache entries self-heal at TTL
    /// expiry.
    pub async fn write(&self, key: &str, value: impl Into<Bytes>) -> Result<WriteReceipt> {
        validate_key(key)?;
        let shard_id = self.router.route(key);

        let put = self.store.put(shard_id, key, value.into());
        let record = match timeout(self.config.store_timeout, put).await {
            Ok(Ok(record)) => record,
            Ok(Err(e @ Error::Config(_))) => return Err(e),
            Ok(Err(e @ Error::WriteFailed { .. })) => return Err(e),
            Ok(Err(e)) => {
                return Err(Error::WriteFailed {
                    shard_id,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(Error::WriteFailed {
                    shard_id,
                    reason: format!("store write timed out after {:?}", self.config.store_timeout),
                })
            }
        };

        // Invalidation strictly after the commit; the reverse order would
        // let a concurrent reader repopulate the pre-write value
        self.l1.invalidate(key);
        self.l2_invalidate(key).await;

        debug!("write committed: key={} shard={}", key, shard_id);
        Ok(WriteReceipt { shard_id, record })
    }

    /// Point-in-time statistics snapshot; never mutates access state.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.update_l1_entries(self.l1.len() as u64);
        self.stats.snapshot()
    }

    /// Per-shard record counts from the backing store.
    pub async fn shard_distribution(&self) -> Result<Vec<usize>> {
        let mut counts = Vec::with_capacity(self.config.num_shards as usize);
        for shard_id in 0..self.config.num_shards {
            counts.push(self.store.shard_len(shard_id).await?);
        }
        Ok(counts)
    }

    /// Empty both cache tiers. The store is untouched.
    pub async fn clear_caches(&self) {
        self.l1.clear();
        match timeout(self.config.l2_timeout, self.l2.clear()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.record_l2_error();
                warn!("L2 clear failed: {}", e);
            }
            Err(_) => {
                self.stats.record_l2_error();
                warn!("L2 clear timed out after {:?}", self.config.l2_timeout);
            }
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Get a reference to the in-process cache
    pub fn l1(&self) -> &L1Cache {
        &self.l1
    }

    /// L2 lookup with a bounded timeout. Failures and timeouts fall through
    /// as misses but are counted distinctly, since they signal cache
    /// degradation rather than cold data.
    async fn l2_get(&self, key: &str) -> Option<Record> {
        match timeout(self.config.l2_timeout, self.l2.get(key)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                self.stats.record_l2_error();
                warn!("L2 get failed for key {}: {}", key, e);
                None
            }
            Err(_) => {
                self.stats.record_l2_error();
                warn!(
                    "L2 get for key {} timed out after {:?}",
                    key, self.config.l2_timeout
                );
                None
            }
        }
    }

    async fn l2_put(&self, key: &str, record: Record) {
        let put = self.l2.put(key, record, self.config.l2_ttl);
        match timeout(self.config.l2_timeout, put).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.record_l2_error();
                warn!("L2 put failed for key {}: {}", key, e);
            }
            Err(_) => {
                self.stats.record_l2_error();
                warn!(
                    "L2 put for key {} timed out after {:?}",
                    key, self.config.l2_timeout
                );
            }
        }
    }

    async fn l2_invalidate(&self, key: &str) {
        match timeout(self.config.l2_timeout, self.l2.invalidate(key)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.record_l2_error();
                warn!("L2 invalidation failed for key {}: {}", key, e);
            }
            Err(_) => {
                self.stats.record_l2_error();
                warn!(
                    "L2 invalidation for key {} timed out after {:?}",
                    key, self.config.l2_timeout
                );
            }
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey("key must be non-empty".into()));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
