//! Shard routing
//!
//! Maps a logical key to exactly one backing-store partition via a stable
//! non-cryptographic hash reduced modulo the shard count. For a fixed shard
//! count the mapping is a pure function of the key: identical keys land on
//! identical shards across calls, router instances, and processes. Changing
//! the shard count invalidates the mapping for existing keys; resharding is
//! an operational data migration, not a runtime capability.

use crate::error::{Error, Result};

/// Routes keys to shard indices in `[0, num_shards)`
#[derive(Debug, Clone)]
pub struct ShardRouter {
    num_shards: u32,
}

impl ShardRouter {
    /// Create a router for a fixed shard count.
    ///
    /// A zero shard count is a fatal configuration error.
    pub fn new(num_shards: u32) -> Result<Self> {
        if num_shards == 0 {
            return Err(Error::Config("num_shards must be at least 1".into()));
        }
        Ok(Self { num_shards })
    }

    /// Get the configured shard count
    pub fn num_shards(&self) -> u32 {
        self.num_shards
    }

    /// Compute the shard index for a key.
    ///
    /// Pure and deterministic; callers guarantee non-empty keys (the access
    /// layer rejects empty keys before routing).
    #[inline]
    pub fn route(&self, key: &str) -> u32 {
        (fx_hash(key.as_bytes()) % self.num_shards as u64) as u32
    }
}

/// Fast non-cryptographic hash (FxHash algorithm).
///
/// Unlike `DefaultHasher`, the output is stable across processes and Rust
/// releases, which the routing invariant depends on.
#[inline]
fn fx_hash(bytes: &[u8]) -> u64 {
    const SEED: u64 = 0x517cc1b727220a95;
    let mut hash = SEED;
    for &byte in bytes {
        hash = hash.rotate_left(5) ^ (byte as u64);
        hash = hash.wrapping_mul(SEED);
    }
    hash
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_zero_shards_rejected() {
        assert_matches!(ShardRouter::new(0), Err(Error::Config(_)));
    }

    #[test]
    fn test_route_in_range() {
        let router = ShardRouter::new(3).unwrap();
        for i in 0..100 {
            let shard = router.route(&format!("key-{}", i));
            assert!(shard < 3);
        }
    }

    #[test]
    fn test_route_deterministic_across_calls() {
        let router = ShardRouter::new(3).unwrap();
        let first = router.route("consistent_key");
        for _ in 0..10 {
            assert_eq!(router.route("consistent_key"), first);
        }
    }

    #[test]
    fn test_route_deterministic_across_instances() {
        let a = ShardRouter::new(8).unwrap();
        let b = ShardRouter::new(8).unwrap();
        for key in ["user:123", "product:456", "order:789", "session:abc"] {
            assert_eq!(a.route(key), b.route(key));
        }
    }

    #[test]
    fn test_distribution_roughly_uniform() {
        let router = ShardRouter::new(3).unwrap();
        let mut counts = [0u32; 3];

        for i in 1..=300 {
            counts[router.route(&format!("user:{}", i)) as usize] += 1;
        }

        // 300 keys over 3 shards: each shard within 15% of 100
        for (shard, count) in counts.iter().enumerate() {
            assert!(
                (85..=115).contains(count),
                "shard {} has {} keys",
                shard,
                count
            );
        }
    }

    proptest! {
        #[test]
        fn prop_route_stable(key in ".+", shards in 1u32..64) {
            let a = ShardRouter::new(shards).unwrap();
            let b = ShardRouter::new(shards).unwrap();
            let shard = a.route(&key);
            prop_assert!(shard < shards);
            prop_assert_eq!(shard, a.route(&key));
            prop_assert_eq!(shard, b.route(&key));
        }
    }
}
