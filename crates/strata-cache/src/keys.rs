//! Backing store key derivation.
//!
//! Every process sharing a store must derive identical names, so the layout
//! here is part of the wire contract:
//!
//! - version counter: `<version_prefix><key>`
//! - data entry: `<data_prefix><key>:<version>`

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use strata_core::{Result, Version};

use crate::config::CacheConfig;

/// Namespaces for the two kinds of backing store keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    version_prefix: String,
    data_prefix: String,
}

impl KeySpace {
    pub fn new(version_prefix: impl Into<String>, data_prefix: impl Into<String>) -> Self {
        Self {
            version_prefix: version_prefix.into(),
            data_prefix: data_prefix.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.version_prefix.clone(), config.data_prefix.clone())
    }

    /// Key of the version counter for a logical key.
    pub fn version_key(&self, key: &str) -> String {
        format!("{}{}", self.version_prefix, key)
    }

    /// Key of the data entry for a logical key at a version.
    pub fn data_key(&self, key: &str, version: Version) -> String {
        format!("{}{}:{}", self.data_prefix, key, version)
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Build a logical key for a query object, e.g. a paginated list request.
///
/// The query is serialized to JSON and base64 encoded so that equal queries
/// map to the same key: `<namespace>:<base64(json)>`.
pub fn query_key<T: Serialize + ?Sized>(namespace: &str, query: &T) -> Result<String> {
    let json = serde_json::to_vec(query)?;
    Ok(format!("{}:{}", namespace, STANDARD.encode(json)))
}
