//! Strata Core
//!
//! Shared vocabulary for the Strata versioned cache: the error type, the
//! per-key `Version`, and the `BackingStore` port that remote tiers implement.
//! This crate has minimal dependencies so adapters can depend on it without
//! pulling in the cache itself.

pub mod error;
pub mod ports;
pub mod version;

pub use error::{Error, Result};
pub use ports::BackingStore;
pub use version::Version;
