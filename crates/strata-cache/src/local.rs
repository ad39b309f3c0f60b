//! In-process tier of the cache.

use bytes::Bytes;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::time::Duration;
use strata_core::Version;

use crate::config::CacheConfig;
use crate::types::LocalEntry;

/// Bounded, thread-safe map from logical key to `(value, version)`.
///
/// The tier never decides whether an entry is current; the manager compares
/// the stored version with the backing store's counter on every read. Losing
/// an entry to eviction or expiry only costs a remote round trip.
///
/// Over capacity, the least recently used entry goes first (not the oldest
/// written); expiry is still measured from the write.
#[derive(Clone)]
pub struct LocalTier {
    entries: Cache<String, LocalEntry>,
}

impl LocalTier {
    pub fn new(capacity: u64, expiry: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(expiry)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { entries }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.local_capacity, config.local_expiry())
    }

    pub fn lookup(&self, key: &str) -> Option<LocalEntry> {
        self.entries.get(key)
    }

    /// Store an entry, replacing whatever was there regardless of version.
    pub fn insert(&self, key: &str, value: Bytes, version: Version) {
        self.entries
            .insert(key.to_string(), LocalEntry { value, version });
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate number of resident entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending evictions and expirations now.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl std::fmt::Debug for LocalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTier")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}
