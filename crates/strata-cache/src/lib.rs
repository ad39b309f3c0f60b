//! Versioned two-tier cache for Strata.
//!
//! A bounded in-process tier sits in front of a shared [`BackingStore`].
//! Per-key version counters held by the store decide which tier's copy is
//! current, so any number of processes can share the store without serving
//! each other stale data.
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_cache::{CacheConfig, CacheManager, MemoryStore};
//!
//! let cache = CacheManager::new(Arc::new(MemoryStore::new()), CacheConfig::default())?;
//! cache.put("list:page:A", r#"{"page":1}"#).await;
//! assert!(cache.get("list:page:A").await.is_some());
//! ```

pub mod config;
pub mod health;
pub mod keys;
pub mod local;
pub mod manager;
pub mod memory;
pub mod metrics;
pub mod types;

pub use config::CacheConfig;
pub use health::{HealthCheck, HealthStatus};
pub use keys::{KeySpace, query_key};
pub use local::LocalTier;
pub use manager::CacheManager;
pub use memory::MemoryStore;
pub use metrics::{CacheMetrics, LatencyTimer};
pub use strata_core::{BackingStore, Error, Result, Version};
pub use types::{CacheStats, LocalEntry, LookupPath};
