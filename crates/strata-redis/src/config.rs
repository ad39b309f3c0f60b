//! Configuration for the Redis backing store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strata_core::{Error, Result};

/// Connection settings for a Redis or KeyDB server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// `host:port`, optionally with a `redis://` or `rediss://` scheme.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Connect over TLS.
    #[serde(default)]
    pub tls: bool,
    /// Name of the environment variable holding the password.
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,
    /// Number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "localhost:6379".to_string()
}

fn default_auth_token_env() -> String {
    "STRATA_REDIS_PASSWORD".to_string()
}

fn default_pool_size() -> usize {
    4
}

fn default_connection_timeout() -> u64 {
    5
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            tls: false,
            auth_token_env: default_auth_token_env(),
            pool_size: default_pool_size(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }
}

impl RedisConfig {
    /// Create a new config for a single endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Enable or disable TLS.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Set the pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the environment variable the password is read from.
    pub fn with_auth_token_env(mut self, name: impl Into<String>) -> Self {
        self.auth_token_env = name.into();
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Endpoint without any URL scheme.
    pub fn host_port(&self) -> &str {
        self.endpoint
            .trim_start_matches("rediss://")
            .trim_start_matches("redis://")
    }

    /// Password from the configured environment variable, if set.
    pub fn auth_token(&self) -> Option<String> {
        std::env::var(&self.auth_token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }
}
