//! Shared helpers for cache integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use strata_cache::{BackingStore, CacheConfig, CacheManager, Error, MemoryStore, Result};

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,strata_cache=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A manager over a fresh in-memory store.
pub fn memory_manager(config: CacheConfig) -> (Arc<MemoryStore>, CacheManager) {
    init_test_logging();
    let store = Arc::new(MemoryStore::new());
    let manager = CacheManager::new(store.clone(), config).expect("valid config");
    (store, manager)
}

/// Backing store whose calls can be made to fail on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_increment: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_delete: AtomicBool,
    pub unreachable: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn check(&self, flag: &AtomicBool) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) || flag.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BackingStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.check(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        self.check(&self.fail_set)?;
        self.inner.set(key, value, ttl).await
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        self.check(&self.fail_increment)?;
        self.inner.increment(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check(&self.fail_delete)?;
        self.inner.delete(key).await
    }

    async fn ping(&self) -> Result<()> {
        self.check(&AtomicBool::new(false))
    }
}
