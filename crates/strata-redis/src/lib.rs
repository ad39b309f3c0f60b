//! Redis/KeyDB backing store for the Strata cache.

pub mod config;
mod store;

pub use config::RedisConfig;
pub use store::{RedisStore, parse_host_port};
