//! Port traits (hexagonal architecture).
//!
//! These traits define the interface between the cache and the shared
//! key-value store it is layered on.

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Shared, network-accessible key-value store backing the remote tier.
///
/// Every call is its own atomic unit; callers must not assume any
/// transaction spanning several calls.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Get the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;

    /// Atomically increment the integer at `key` and return the new value.
    ///
    /// An absent key counts from zero. Must be linearizable across all
    /// callers in all processes.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
