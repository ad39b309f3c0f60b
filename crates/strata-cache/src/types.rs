//! Cache types and statistics.

use bytes::Bytes;
use strata_core::Version;

/// A value held by the local tier together with the version it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub value: Bytes,
    pub version: Version,
}

/// Where a `get` was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPath {
    /// Local entry matched the current version.
    Local,
    /// Fetched from the backing store and written back locally.
    Remote,
    /// Nothing to return.
    Miss,
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub local_hits: u64,
    pub remote_hits: u64,
    pub misses: u64,
    /// Reads that found a live version whose data entry had already expired.
    pub expired_entries: u64,
    pub puts: u64,
    pub put_failures: u64,
    pub deletes: u64,
    pub store_errors: u64,
    pub malformed_versions: u64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.local_hits + self.remote_hits
    }

    /// Fraction of reads that returned a value, or 0 when nothing was read.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits() as f64 / total as f64
    }
}
