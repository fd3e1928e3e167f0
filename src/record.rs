//! Record data model
//!
//! The unit of storage: an opaque value addressed by a unique key within the
//! logical keyspace. Records are created on first write and mutated by later
//! writes to the same key (upsert); the access layer never deletes them.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A stored key/value pair with store-assigned timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Opaque, non-empty identifier, immutable once chosen
    pub key: String,
    /// Opaque payload; the access layer imposes no size or structure
    pub value: Bytes,
    /// Set by the store on first write, preserved across upserts
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every write
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a record as the store would on first write.
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value: value.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an upsert: replace the value and refresh `updated_at`,
    /// preserving `created_at`.
    pub fn updated(&self, value: impl Into<Bytes>) -> Self {
        Self {
            key: self.key.clone(),
            value: value.into(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
