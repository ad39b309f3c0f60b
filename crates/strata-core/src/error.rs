//! Error types for Strata.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Backing store errors
    #[error("Backing store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed version for key {key}: {raw:?}")]
    MalformedVersion { key: String, raw: String },

    // Local errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether the error came from talking to the backing store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
