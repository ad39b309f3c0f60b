//! Per-key version numbers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A version issued by the backing store's atomic counter.
///
/// Versions start at 1 and only ever grow for a given key. A key with no
/// version has never been written (or has been deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The first version issued for a fresh key.
    pub const FIRST: Version = Version(1);

    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Convert the result of an atomic increment.
    pub fn from_counter(key: &str, value: i64) -> Result<Self> {
        u64::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::MalformedVersion {
                key: key.to_string(),
                raw: value.to_string(),
            })
    }

    /// Parse the raw bytes stored under a version counter key.
    pub fn parse(key: &str, raw: &[u8]) -> Result<Self> {
        let malformed = || Error::MalformedVersion {
            key: key.to_string(),
            raw: String::from_utf8_lossy(raw).into_owned(),
        };

        let text = std::str::from_utf8(raw).map_err(|_| malformed())?;
        text.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(malformed)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse("", s.as_bytes())
    }
}
