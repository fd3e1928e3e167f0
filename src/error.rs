//! Error types for the tiered access layer

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the tiered access layer
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed key, rejected before routing
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Configuration rejected at construction (fatal, not retried)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A cache tier failed or timed out; absorbed by the access layer
    /// and never surfaced to callers
    #[error("Cache tier {tier} unavailable: {reason}")]
    CacheUnavailable { tier: &'static str, reason: String },

    /// The authoritative store could not serve a read
    #[error("Store unavailable for shard {shard_id}: {reason}")]
    StoreUnavailable { shard_id: u32, reason: String },

    /// The store write did not commit; no cache state was touched
    #[error("Write failed for shard {shard_id}: {reason}")]
    WriteFailed { shard_id: u32, reason: String },
}

impl Error {
    /// Whether a failed operation is safe to retry as a whole.
    ///
    /// Writes are idempotent upserts by key, so a failed write can be
    /// reissued; configuration and key errors are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::CacheUnavailable { .. }
                | Error::StoreUnavailable { .. }
                | Error::WriteFailed { .. }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
