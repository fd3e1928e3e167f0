//! Access-layer configuration
//!
//! All tunables are fixed at construction and passed by reference to each
//! component. There is no runtime mutation; changing the shard count in
//! particular requires a data migration and a new deployment.

use std::time::Duration;

use crate::error::{Error, Result};

/// Immutable configuration for the access layer and its tiers
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Number of backing-store partitions
    pub num_shards: u32,
    /// Maximum number of entries held by the in-process L1 cache
    pub l1_max_entries: usize,
    /// Freshness window for L1 entries
    pub l1_ttl: Duration,
    /// TTL applied to entries written to the shared L2 cache
    pub l2_ttl: Duration,
    /// Upper bound on a single L2 round trip before falling through
    pub l2_timeout: Duration,
    /// Upper bound on a single store round trip
    pub store_timeout: Duration,
    /// Connections per shard in the store client pool
    pub store_pool_size: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            num_shards: 3,
            l1_max_entries: 100,
            l1_ttl: Duration::from_secs(60),
            l2_ttl: Duration::from_secs(300),
            l2_timeout: Duration::from_millis(250),
            store_timeout: Duration::from_secs(2),
            store_pool_size: 10,
        }
    }
}

impl AccessConfig {
    /// Validate the configuration, rejecting values that would leave a
    /// component inoperable.
    pub fn validate(&self) -> Result<()> {
        if self.num_shards == 0 {
            return Err(Error::Config("num_shards must be at least 1".into()));
        }
        if self.l1_max_entries == 0 {
            return Err(Error::Config("l1_max_entries must be at least 1".into()));
        }
        if self.l1_ttl.is_zero() || self.l2_ttl.is_zero() {
            return Err(Error::Config("cache TTLs must be non-zero".into()));
        }
        if self.l2_timeout.is_zero() || self.store_timeout.is_zero() {
            return Err(Error::Config("tier timeouts must be non-zero".into()));
        }
        if self.store_pool_size == 0 {
            return Err(Error::Config("store_pool_size must be at least 1".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
