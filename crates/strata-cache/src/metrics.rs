//! Metrics for cache observability.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::types::CacheStats;

/// Counters updated by the cache manager.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Reads served by a current local entry.
    pub local_hits: AtomicU64,
    /// Reads served by the backing store.
    pub remote_hits: AtomicU64,
    /// Reads that returned nothing.
    pub misses: AtomicU64,
    /// Reads that found a version but no data entry.
    pub expired_entries: AtomicU64,
    /// Successful writes.
    pub puts: AtomicU64,
    /// Abandoned writes.
    pub put_failures: AtomicU64,
    /// Deletes that removed a live key.
    pub deletes: AtomicU64,
    /// Failed backing store calls.
    pub store_errors: AtomicU64,
    /// Version counters that could not be parsed.
    pub malformed_versions: AtomicU64,
}

impl CacheMetrics {
    /// Create new metrics instance.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_local_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_hit(&self) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired_entry(&self) {
        self.expired_entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put_failure(&self) {
        self.put_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_version(&self) {
        self.malformed_versions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_entries: self.expired_entries.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            put_failures: self.put_failures.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            malformed_versions: self.malformed_versions.load(Ordering::Relaxed),
        }
    }
}

/// Timer for measuring backing store round trips.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
