//! Process-local backing store.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use strata_core::ports::BackingStore;
use strata_core::{Error, Result};
use tokio::sync::RwLock;

struct StoredValue {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Minimum number of writes between sweeps of expired keys.
const SWEEP_MIN_WRITES: usize = 128;

#[derive(Default)]
struct Entries {
    map: HashMap<String, StoredValue>,
    writes_since_sweep: usize,
    live_after_sweep: usize,
}

impl Entries {
    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, v| v.is_live(now));
        self.writes_since_sweep = 0;
        self.live_after_sweep = self.map.len();
        before - self.map.len()
    }

    /// Sweep once the writes since the last sweep outnumber the keys that
    /// survived it, which keeps the map within about twice its live size.
    fn insert(&mut self, key: &str, stored: StoredValue, now: Instant) {
        self.map.insert(key.to_string(), stored);
        self.writes_since_sweep += 1;
        if self.writes_since_sweep >= self.live_after_sweep.max(SWEEP_MIN_WRITES) {
            self.purge_expired(now);
        }
    }
}

/// In-memory `BackingStore` with Redis-like semantics.
///
/// Counters are stored as ASCII decimal without a TTL, values honour their
/// TTL on read. Expired keys are reclaimed by periodic sweeps on the write
/// path. Suitable for single-node deployments and tests; it is not shared
/// across processes.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.map.values().filter(|v| v.is_live(now)).count()
    }

    /// Number of keys held in memory, including expired ones not yet swept.
    pub async fn resident_len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired keys, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.purge_expired(now)
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .map
            .get(key)
            .filter(|v| v.is_live(now))
            .map(|v| v.value.clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl);
        let mut entries = self.entries.write().await;
        entries.insert(key, StoredValue { value, expires_at }, now);
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        // An existing counter keeps its expiry, like INCR.
        let (current, expires_at) = match entries.map.get(key).filter(|v| v.is_live(now)) {
            Some(stored) => {
                let current = std::str::from_utf8(&stored.value)
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or_else(|| Error::MalformedVersion {
                        key: key.to_string(),
                        raw: String::from_utf8_lossy(&stored.value).into_owned(),
                    })?;
                (current, stored.expires_at)
            }
            None => (0, None),
        };

        let next = current
            .checked_add(1)
            .ok_or_else(|| Error::Store(format!("Counter overflow for key {}", key)))?;

        entries.insert(
            key,
            StoredValue {
                value: Bytes::from(next.to_string()),
                expires_at,
            },
            now,
        );
        Ok(next)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.map.remove(key);
        Ok(())
    }
}
