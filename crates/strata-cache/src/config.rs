//! Cache configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strata_core::{Error, Result};

/// Configuration for the versioned cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of versioned data entries in the backing store, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of entries held by the local tier.
    #[serde(default = "default_local_capacity")]
    pub local_capacity: u64,
    /// Write-time expiry of local entries. Falls back to `ttl_secs`.
    #[serde(default)]
    pub local_expiry_secs: Option<u64>,
    /// Prefix of version counter keys in the backing store.
    #[serde(default = "default_version_prefix")]
    pub version_prefix: String,
    /// Prefix of data keys in the backing store.
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,
}

fn default_ttl_secs() -> u64 {
    100 * 60
}

fn default_local_capacity() -> u64 {
    10_000
}

fn default_version_prefix() -> String {
    "cache:version:".to_string()
}

fn default_data_prefix() -> String {
    "cache:data:".to_string()
}

fn whole_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            local_capacity: default_local_capacity(),
            local_expiry_secs: None,
            version_prefix: default_version_prefix(),
            data_prefix: default_data_prefix(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the remote data entry TTL, rounded up to whole seconds.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = whole_secs(ttl);
        self
    }

    /// Set the local tier capacity.
    pub fn with_local_capacity(mut self, capacity: u64) -> Self {
        self.local_capacity = capacity;
        self
    }

    /// Set the local tier expiry independently of the remote TTL, rounded up
    /// to whole seconds.
    pub fn with_local_expiry(mut self, expiry: Duration) -> Self {
        self.local_expiry_secs = Some(whole_secs(expiry));
        self
    }

    /// Set both backing store key prefixes.
    pub fn with_prefixes(
        mut self,
        version_prefix: impl Into<String>,
        data_prefix: impl Into<String>,
    ) -> Self {
        self.version_prefix = version_prefix.into();
        self.data_prefix = data_prefix.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn local_expiry(&self) -> Duration {
        Duration::from_secs(self.local_expiry_secs.unwrap_or(self.ttl_secs))
    }

    /// Reject settings the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ttl_secs == 0 {
            return Err(Error::Config("ttl_secs must be greater than zero".into()));
        }
        if self.local_expiry_secs == Some(0) {
            return Err(Error::Config(
                "local_expiry_secs must be greater than zero".into(),
            ));
        }
        if self.local_capacity == 0 {
            return Err(Error::Config(
                "local_capacity must be greater than zero".into(),
            ));
        }
        if self.version_prefix.is_empty() || self.data_prefix.is_empty() {
            return Err(Error::Config("key prefixes must not be empty".into()));
        }
        // A prefix of the other would let a logical key land in both namespaces.
        if self.version_prefix.starts_with(&self.data_prefix)
            || self.data_prefix.starts_with(&self.version_prefix)
        {
            return Err(Error::Config(format!(
                "key prefixes overlap: {:?} and {:?}",
                self.version_prefix, self.data_prefix
            )));
        }
        Ok(())
    }
}
