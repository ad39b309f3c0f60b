//! Integration tests for strata-redis.
//!
//! These tests start a Redis container and require a Docker daemon.
//! Run with: `cargo test -p strata-redis --features integration`

#![cfg(feature = "integration")]

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use strata_cache::{CacheConfig, CacheManager, Version};
use strata_core::ports::BackingStore;
use strata_redis::{RedisConfig, RedisStore};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::{REDIS_PORT, Redis};

/// Redis container kept alive for the duration of a test.
struct RedisContainer {
    #[allow(dead_code)] // Kept to maintain container lifetime
    container: ContainerAsync<Redis>,
    store: RedisStore,
}

impl RedisContainer {
    async fn start() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let container = Redis::default().start().await.expect("start redis");
        let host = container.get_host().await.expect("host");
        let port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .expect("port");

        let config = RedisConfig::new(format!("redis://{}:{}", host, port));
        let store = RedisStore::connect(&config).await.expect("connect");

        Self { container, store }
    }

    fn manager(&self) -> CacheManager {
        CacheManager::new(Arc::new(self.store.clone()), CacheConfig::default()).expect("manager")
    }
}

#[tokio::test]
async fn test_store_primitives() {
    let redis = RedisContainer::start().await;
    let store = &redis.store;

    assert_eq!(store.get("missing").await.unwrap(), None);

    store
        .set("k", Bytes::from_static(b"v"), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));

    assert_eq!(store.increment("c").await.unwrap(), 1);
    assert_eq!(store.increment("c").await.unwrap(), 2);
    assert_eq!(store.get("c").await.unwrap(), Some(Bytes::from_static(b"2")));

    store.delete("c").await.unwrap();
    store.delete("c").await.unwrap();
    assert_eq!(store.increment("c").await.unwrap(), 1);

    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_data_entries_expire() {
    let redis = RedisContainer::start().await;
    let store = &redis.store;

    store
        .set("short", Bytes::from_static(b"v"), Duration::from_millis(200))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.get("short").await.unwrap(), None);
}

#[tokio::test]
async fn test_increment_on_non_integer_is_malformed() {
    let redis = RedisContainer::start().await;
    let store = &redis.store;

    store
        .set("c", Bytes::from_static(b"abc"), Duration::from_secs(60))
        .await
        .unwrap();
    let err = store.increment("c").await.unwrap_err();
    assert!(matches!(err, strata_core::Error::MalformedVersion { .. }));
}

#[tokio::test]
async fn test_managers_share_versions() {
    let redis = RedisContainer::start().await;
    let writer = redis.manager();
    let reader = redis.manager();

    assert_eq!(writer.put("list:page:A", r#"{"page":1}"#).await, Some(Version::FIRST));
    assert_eq!(reader.get("list:page:A").await, Some(Bytes::from_static(br#"{"page":1}"#)));

    assert_eq!(writer.put("list:page:A", r#"{"page":2}"#).await, Version::new(2));
    assert_eq!(reader.get("list:page:A").await, Some(Bytes::from_static(br#"{"page":2}"#)));

    reader.delete("list:page:A").await;
    assert_eq!(writer.get("list:page:A").await, None);
    assert_eq!(writer.put("list:page:A", r#"{"page":3}"#).await, Some(Version::FIRST));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_puts_get_distinct_versions() {
    let redis = RedisContainer::start().await;
    let cache = Arc::new(redis.manager());

    let handles: Vec<_> = (0..32u64)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move { (i, cache.put("hot", i.to_string()).await.unwrap()) })
        })
        .collect();

    let mut issued = Vec::new();
    for handle in handles {
        issued.push(handle.await.unwrap());
    }

    let mut versions: Vec<u64> = issued.iter().map(|(_, v)| v.get()).collect();
    versions.sort_unstable();
    assert_eq!(versions, (1..=32).collect::<Vec<u64>>());

    let (winner, _) = issued.iter().max_by_key(|(_, v)| *v).unwrap();
    assert_eq!(cache.get("hot").await, Some(Bytes::from(winner.to_string())));
}

#[tokio::test]
async fn test_health_check() {
    let redis = RedisContainer::start().await;
    let health = redis.manager().health_check().await;
    assert!(health.status.is_healthy());

    redis.store.shutdown().await.unwrap();
}
