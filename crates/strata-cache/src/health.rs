//! Health check for the cache and its backing store.

use crate::types::CacheStats;

/// Health status of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backing store reachable, no failures recorded.
    Healthy,
    /// Reachable, but store calls have failed.
    Degraded { reason: String },
    /// Backing store unreachable; every read degrades to a miss.
    Unhealthy { reason: String },
}

impl HealthStatus {
    /// Check if the status is healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Check if the cache is operational (healthy or degraded).
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded { .. })
    }
}

/// Health check result with details.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub store_reachable: bool,
    pub hit_ratio: f64,
    pub store_errors: u64,
    pub put_failures: u64,
}

impl HealthCheck {
    /// Create a health check from statistics and a store ping result.
    pub fn from_stats(stats: &CacheStats, store_reachable: bool) -> Self {
        let status = if store_reachable {
            if stats.store_errors > 0 {
                HealthStatus::Degraded {
                    reason: format!("{} backing store errors recorded", stats.store_errors),
                }
            } else {
                HealthStatus::Healthy
            }
        } else {
            HealthStatus::Unhealthy {
                reason: "Backing store unreachable".to_string(),
            }
        };

        Self {
            status,
            store_reachable,
            hit_ratio: stats.hit_ratio(),
            store_errors: stats.store_errors,
            put_failures: stats.put_failures,
        }
    }
}
