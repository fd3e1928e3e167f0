//! Cache entry types
//!
//! A cached record stamped with its insertion time and freshness window.
//! Expiry is lazy: an entry past its TTL is treated as absent by the next
//! lookup and removed then, not by a background sweeper.

use std::time::{Duration, Instant};

use crate::record::Record;

/// A record held by a cache tier together with its freshness window
#[derive(Debug, Clone)]
pub struct CacheEntry {
    record: Record,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Stamp a record for caching with the tier's TTL.
    pub fn new(record: Record, ttl: Duration) -> Self {
        Self {
            record,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Borrow the cached record
    #[inline]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Consume the entry, yielding the record
    #[inline]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Check whether the entry has outlived its freshness window
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }

    /// Time since the entry was inserted
    #[inline]
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn make_record(key: &str, value: &'static [u8]) -> Record {
        Record::new(key, Bytes::from_static(value))
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CacheEntry::new(make_record("k", b"v"), Duration::from_secs(60));
        assert!(!entry.is_expired());
        assert_eq!(entry.record().value.as_ref(), b"v");
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::new(make_record("k", b"v"), Duration::from_millis(10));
        assert!(!entry.is_expired());

        std::thread::sleep(Duration::from_millis(25));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_into_record_round_trip() {
        let record = make_record("k", b"payload");
        let entry = CacheEntry::new(record.clone(), Duration::from_secs(1));
        assert_eq!(entry.into_record(), record);
    }
}
