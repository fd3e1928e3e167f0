//! Access statistics
//!
//! Per-tier hit/miss counters for observability. The recorder is an
//! explicitly-owned instance held by the access layer (not a process-wide
//! singleton) so unit tests get fresh counters. Counters are monotonic and
//! reset only when the owning access layer is dropped.
//!
//! Increments are atomic; a snapshot reads each counter atomically but makes
//! no cross-counter consistency claim, which keeps readers from ever
//! blocking writers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Statistics recorder with atomic per-tier counters
#[derive(Debug, Default)]
pub struct AccessStats {
    l1_hits: AtomicU64,
    l1_misses: AtomicU64,
    l2_hits: AtomicU64,
    l2_misses: AtomicU64,
    /// L2 calls that failed or timed out; counted separately from true
    /// misses because they signal cache degradation rather than cold data
    l2_errors: AtomicU64,
    store_reads: AtomicU64,
    l1_entries: AtomicU64,
}

impl AccessStats {
    /// Create a recorder with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_l1_hit(&self) {
        self.l1_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_l1_miss(&self) {
        self.l1_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_l2_hit(&self) {
        self.l2_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_l2_miss(&self) {
        self.l2_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_l2_error(&self) {
        self.l2_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_read(&self) {
        self.store_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_l1_entries(&self, entries: u64) {
        self.l1_entries.store(entries, Ordering::Relaxed);
    }

    pub fn l1_hits(&self) -> u64 {
        self.l1_hits.load(Ordering::Relaxed)
    }

    pub fn l1_misses(&self) -> u64 {
        self.l1_misses.load(Ordering::Relaxed)
    }

    pub fn l2_hits(&self) -> u64 {
        self.l2_hits.load(Ordering::Relaxed)
    }

    pub fn l2_misses(&self) -> u64 {
        self.l2_misses.load(Ordering::Relaxed)
    }

    pub fn l2_errors(&self) -> u64 {
        self.l2_errors.load(Ordering::Relaxed)
    }

    pub fn store_reads(&self) -> u64 {
        self.store_reads.load(Ordering::Relaxed)
    }

    /// Fraction of reads served by L1; 0.0 when no reads observed
    pub fn l1_hit_rate(&self) -> f64 {
        ratio(self.l1_hits(), self.l1_misses())
    }

    /// Fraction of L2 attempts served by L2; 0.0 when no attempts observed
    pub fn l2_hit_rate(&self) -> f64 {
        ratio(self.l2_hits(), self.l2_misses())
    }

    /// Fraction of all reads served without reaching the store.
    ///
    /// Every L1 miss triggers an L2 attempt, so `l1_hits + l1_misses` is the
    /// total read count that any cache tier could have served.
    pub fn combined_hit_rate(&self) -> f64 {
        let total = self.l1_hits() + self.l1_misses();
        if total == 0 {
            0.0
        } else {
            (self.l1_hits() + self.l2_hits()) as f64 / total as f64
        }
    }

    /// Point-in-time view of all counters and derived rates
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            l1_hits: self.l1_hits(),
            l1_misses: self.l1_misses(),
            l2_hits: self.l2_hits(),
            l2_misses: self.l2_misses(),
            l2_errors: self.l2_errors(),
            store_reads: self.store_reads(),
            l1_entries: self.l1_entries.load(Ordering::Relaxed),
            l1_hit_rate: self.l1_hit_rate(),
            l2_hit_rate: self.l2_hit_rate(),
            combined_hit_rate: self.combined_hit_rate(),
        }
    }
}

fn ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Snapshot of access statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub l1_hits: u64,
    pub l1_misses: u64,
    pub l2_hits: u64,
    pub l2_misses: u64,
    pub l2_errors: u64,
    pub store_reads: u64,
    pub l1_entries: u64,
    pub l1_hit_rate: f64,
    pub l2_hit_rate: f64,
    pub combined_hit_rate: f64,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_recorder_is_zero() {
        let stats = AccessStats::new();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.l1_hits, 0);
        assert_eq!(snapshot.l2_misses, 0);
        assert_eq!(snapshot.store_reads, 0);
    }

    #[test]
    fn test_hit_rate_arithmetic() {
        let stats = AccessStats::new();
        stats.record_l1_hit();
        stats.record_l1_hit();
        stats.record_l1_miss();

        assert!((stats.l1_hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate_zero_guard() {
        let stats = AccessStats::new();
        assert_eq!(stats.l1_hit_rate(), 0.0);
        assert_eq!(stats.l2_hit_rate(), 0.0);
        assert_eq!(stats.combined_hit_rate(), 0.0);
    }

    #[test]
    fn test_combined_hit_rate() {
        let stats = AccessStats::new();
        // 2 L1 hits, 2 L1 misses of which 1 was served by L2
        stats.record_l1_hit();
        stats.record_l1_hit();
        stats.record_l1_miss();
        stats.record_l1_miss();
        stats.record_l2_hit();
        stats.record_l2_miss();
        stats.record_store_read();

        assert!((stats.combined_hit_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_l2_errors_counted_distinctly() {
        let stats = AccessStats::new();
        stats.record_l1_miss();
        stats.record_l2_miss();
        stats.record_l2_error();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.l2_misses, 1);
        assert_eq!(snapshot.l2_errors, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = AccessStats::new();
        stats.record_l1_hit();
        stats.update_l1_entries(1);

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["l1_hits"], 1);
        assert_eq!(json["l1_entries"], 1);
        assert_eq!(json["l1_hit_rate"], 1.0);
    }

    #[test]
    fn test_concurrent_increments() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(AccessStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_l1_hit();
                        stats.record_l2_miss();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.l1_hits(), 8000);
        assert_eq!(stats.l2_misses(), 8000);
    }
}
