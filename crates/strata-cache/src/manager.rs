//! Versioned two-tier cache manager.
//!
//! Every logical key has a counter in the backing store. Writers obtain a new
//! version by atomically incrementing it and store their value under a data
//! key tagged with that version. Readers look up the counter first and only
//! trust a local entry whose version equals it, so cross-process staleness is
//! bounded by the counter alone.
//!
//! The multi-step operations are not transactional. A `put` that commits
//! between the version read and the counter removal of a concurrent `delete`
//! leaves its data entry unreachable until the TTL reclaims it; readers see
//! a miss, never the orphan.
//!
//! `delete` removes the counter, so the next `put` is issued version 1 again.
//! Another process still holding a local entry at that version passes the
//! version check and keeps serving the value written before the delete until
//! its local entry expires. That stale window is bounded by `local_expiry`;
//! callers that delete and rewrite keys should keep it short.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use strata_core::ports::BackingStore;
use strata_core::{Error, Result, Version};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::health::HealthCheck;
use crate::keys::KeySpace;
use crate::local::LocalTier;
use crate::metrics::{CacheMetrics, LatencyTimer};
use crate::types::{CacheStats, LookupPath};

/// Cache front end over a local tier and a shared backing store.
///
/// Construct once at startup and share the handle (it is cheap to clone).
/// No operation returns an error: failures are logged, counted and turned
/// into a miss or a no-op.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn BackingStore>,
    local: LocalTier,
    keys: KeySpace,
    config: CacheConfig,
    metrics: Arc<CacheMetrics>,
}

impl CacheManager {
    /// Create a manager, validating the configuration.
    pub fn new(store: Arc<dyn BackingStore>, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        info!(
            ttl_secs = config.ttl_secs,
            local_capacity = config.local_capacity,
            local_expiry_secs = config.local_expiry().as_secs(),
            "Cache manager initialized"
        );

        Ok(Self {
            local: LocalTier::from_config(&config),
            keys: KeySpace::from_config(&config),
            store,
            config,
            metrics: CacheMetrics::new(),
        })
    }

    /// Read the current value for `key`.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.lookup(key).await.1
    }

    /// Read the current value for `key`, reporting which path answered.
    pub async fn lookup(&self, key: &str) -> (LookupPath, Option<Bytes>) {
        let Some(version) = self.current_version(key).await else {
            self.metrics.record_miss();
            debug!(key, "Cache miss: no version");
            return (LookupPath::Miss, None);
        };

        match self.local.lookup(key) {
            Some(entry) if entry.version == version => {
                self.metrics.record_local_hit();
                debug!(key, %version, "Local cache hit");
                return (LookupPath::Local, Some(entry.value));
            }
            Some(entry) => {
                debug!(key, local = %entry.version, current = %version, "Local entry is stale");
            }
            None => {}
        }

        let data_key = self.keys.data_key(key, version);
        let timer = LatencyTimer::start();
        match self.store.get(&data_key).await {
            Ok(Some(value)) => {
                self.local.insert(key, value.clone(), version);
                self.metrics.record_remote_hit();
                debug!(key, %version, latency_ms = timer.elapsed_ms(), "Remote cache hit");
                (LookupPath::Remote, Some(value))
            }
            Ok(None) => {
                // The counter outlives its data entry until the next write.
                self.local.invalidate(key);
                self.metrics.record_expired_entry();
                self.metrics.record_miss();
                debug!(key, %version, "Cache miss: data entry expired");
                (LookupPath::Miss, None)
            }
            Err(e) => {
                self.metrics.record_store_error();
                self.metrics.record_miss();
                warn!(key, %version, error = %e, "Failed to fetch cache entry");
                (LookupPath::Miss, None)
            }
        }
    }

    /// Write `value` under a new version of `key`.
    ///
    /// Returns the version issued, or `None` if the write was abandoned. A
    /// failed increment leaves both tiers untouched.
    pub async fn put(&self, key: &str, value: impl Into<Bytes>) -> Option<Version> {
        let value = value.into();
        let counter_key = self.keys.version_key(key);

        let version = match self.next_version(&counter_key).await {
            Ok(version) => version,
            Err(e) => {
                self.record_failure(&e);
                self.metrics.record_put_failure();
                warn!(key, error = %e, "Failed to obtain cache version, write abandoned");
                return None;
            }
        };

        let data_key = self.keys.data_key(key, version);
        if let Err(e) = self.store.set(&data_key, value.clone(), self.config.ttl()).await {
            // The counter already moved on, so readers see a miss for this version.
            self.local.invalidate(key);
            self.record_failure(&e);
            self.metrics.record_put_failure();
            warn!(key, %version, error = %e, "Failed to write cache entry");
            return None;
        }

        self.local.insert(key, value, version);
        self.metrics.record_put();
        debug!(key, %version, "Cache entry written");
        Some(version)
    }

    /// Remove `key` from both tiers and reset its version history.
    pub async fn delete(&self, key: &str) {
        let counter_key = self.keys.version_key(key);

        let version = match self.fetch_version(key).await {
            Ok(Some(version)) => version,
            Ok(None) => {
                debug!(key, "Delete of unknown key ignored");
                return;
            }
            Err(e @ Error::MalformedVersion { .. }) => {
                // Nothing is readable under a corrupt counter; clear it so writes recover.
                self.record_failure(&e);
                warn!(key, error = %e, "Removing malformed version counter");
                self.local.invalidate(key);
                self.delete_remote(key, &counter_key).await;
                return;
            }
            Err(e) => {
                self.record_failure(&e);
                warn!(key, error = %e, "Failed to read cache version, delete skipped");
                return;
            }
        };

        let data_key = self.keys.data_key(key, version);
        self.delete_remote(key, &data_key).await;
        self.local.invalidate(key);
        if self.delete_remote(key, &counter_key).await {
            self.metrics.record_delete();
            debug!(key, %version, "Cache entry deleted");
        }
    }

    /// Deserialize the current JSON value for `key`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Failed to decode cached value");
                None
            }
        }
    }

    /// Serialize `value` as JSON and write it under a new version of `key`.
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Option<Version> {
        match serde_json::to_vec(value) {
            Ok(raw) => self.put(key, raw).await,
            Err(e) => {
                self.metrics.record_put_failure();
                warn!(key, error = %e, "Failed to encode cache value");
                None
            }
        }
    }

    /// The authoritative version of `key`, or `None` if it has none or the
    /// store could not be read.
    pub async fn current_version(&self, key: &str) -> Option<Version> {
        match self.fetch_version(key).await {
            Ok(version) => version,
            Err(e) => {
                self.record_failure(&e);
                warn!(key, error = %e, "Failed to read cache version");
                None
            }
        }
    }

    /// Probe the backing store and summarize recorded failures.
    pub async fn health_check(&self) -> HealthCheck {
        let reachable = match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Backing store ping failed");
                false
            }
        };
        HealthCheck::from_stats(&self.stats(), reachable)
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    pub fn local(&self) -> &LocalTier {
        &self.local
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn fetch_version(&self, key: &str) -> Result<Option<Version>> {
        let counter_key = self.keys.version_key(key);
        match self.store.get(&counter_key).await? {
            Some(raw) => Version::parse(&counter_key, &raw).map(Some),
            None => Ok(None),
        }
    }

    async fn next_version(&self, counter_key: &str) -> Result<Version> {
        let raw = self.store.increment(counter_key).await?;
        Version::from_counter(counter_key, raw)
    }

    async fn delete_remote(&self, key: &str, store_key: &str) -> bool {
        match self.store.delete(store_key).await {
            Ok(()) => true,
            Err(e) => {
                self.record_failure(&e);
                warn!(key, store_key, error = %e, "Failed to delete from backing store");
                false
            }
        }
    }

    fn record_failure(&self, err: &Error) {
        match err {
            Error::MalformedVersion { .. } => self.metrics.record_malformed_version(),
            _ => self.metrics.record_store_error(),
        }
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("local", &self.local)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn manager() -> (Arc<MemoryStore>, CacheManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = CacheManager::new(store.clone(), CacheConfig::default()).unwrap();
        (store, manager)
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let store = Arc::new(MemoryStore::new());
        let config = CacheConfig::default().with_local_capacity(0);
        assert!(CacheManager::new(store, config).is_err());
    }

    #[tokio::test]
    async fn test_get_unknown_key_is_miss() {
        let (_, manager) = manager();
        assert_eq!(manager.lookup("nope").await, (LookupPath::Miss, None));
        assert_eq!(manager.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_put_populates_local_tier() {
        let (_, manager) = manager();
        let version = manager.put("k", "v").await.unwrap();

        let entry = manager.local().lookup("k").unwrap();
        assert_eq!(entry.version, version);
        assert_eq!(manager.lookup("k").await.0, LookupPath::Local);
    }

    #[tokio::test]
    async fn test_remote_read_repopulates_local_tier() {
        let (_, manager) = manager();
        manager.put("k", "v").await.unwrap();
        manager.local().invalidate("k");

        let (path, value) = manager.lookup("k").await;
        assert_eq!(path, LookupPath::Remote);
        assert_eq!(value, Some(Bytes::from_static(b"v")));
        assert_eq!(manager.lookup("k").await.0, LookupPath::Local);
    }

    #[tokio::test]
    async fn test_data_written_with_ttl_under_versioned_key() {
        let (store, manager) = manager();
        let version = manager.put("k", "v").await.unwrap();

        let data_key = manager.keys().data_key("k", version);
        assert_eq!(store.get(&data_key).await.unwrap(), Some(Bytes::from_static(b"v")));
        assert_eq!(
            store.get(&manager.keys().version_key("k")).await.unwrap(),
            Some(Bytes::from(version.to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_key_is_noop() {
        let (store, manager) = manager();
        manager.delete("ghost").await;
        assert!(store.is_empty().await);
        assert_eq!(manager.stats().deletes, 0);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
        struct Page {
            page: u32,
            items: Vec<String>,
        }

        let (_, manager) = manager();
        let page = Page {
            page: 1,
            items: vec!["a".into(), "b".into()],
        };
        manager.put_json("page", &page).await.unwrap();
        assert_eq!(manager.get_json::<Page>("page").await, Some(page));

        manager.put("raw", "not json").await.unwrap();
        assert_eq!(manager.get_json::<Page>("raw").await, None);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_, manager) = manager();
        let health = manager.health_check().await;
        assert!(health.status.is_healthy());
        assert!(health.store_reachable);
    }
}
