//! Redis-backed implementation of the cache's backing store.

use async_trait::async_trait;
use bytes::Bytes;
use fred::clients::Pool;
use fred::error::{Error as RedisError, ErrorKind};
use fred::interfaces::{ClientLike, KeysInterface};
use fred::types::config::{Config, ReconnectPolicy, ServerConfig, TlsConnector};
use fred::types::{Builder, Expiration};
use std::time::Duration;
use strata_core::ports::BackingStore;
use strata_core::{Error, Result};
use tracing::{debug, info};

use crate::config::RedisConfig;

/// Backing store over a pooled Redis/KeyDB connection.
///
/// INCR provides the atomic version counter; data entries are written with
/// `SET .. PX` so they expire on the server.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Connect and verify the server with a PING.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let (host, port) = parse_host_port(config.host_port())?;

        let mut fred_config = Config {
            server: ServerConfig::new_centralized(host, port),
            ..Config::default()
        };

        if config.tls {
            fred_config.tls = Some(TlsConnector::default_rustls().map_err(map_err)?.into());
        }

        if let Some(token) = config.auth_token() {
            fred_config.password = Some(token);
        }

        let timeout = config.connection_timeout();
        let mut builder = Builder::from_config(fred_config);
        builder.with_connection_config(|conn| {
            conn.connection_timeout = timeout;
        });
        // Exponential reconnect: base 100ms, capped at 30s.
        builder.set_policy(ReconnectPolicy::new_exponential(0, 100, 30_000, 2));

        let pool = builder.build_pool(config.pool_size).map_err(map_err)?;
        pool.init().await.map_err(map_err)?;

        let store = Self { pool };
        store.ping().await?;

        info!(
            host,
            port,
            tls = config.tls,
            pool_size = config.pool_size,
            "Redis backing store connected"
        );
        Ok(store)
    }

    /// Wrap an already initialised pool.
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn shutdown(&self) -> Result<()> {
        self.pool.quit().await.map_err(map_err)?;
        info!("Redis backing store closed");
        Ok(())
    }
}

#[async_trait]
impl BackingStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.pool.get(key).await.map_err(map_err)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1);
        let _: () = self
            .pool
            .set(key, value, Some(Expiration::PX(millis)), None, false)
            .await
            .map_err(map_err)?;
        debug!(key, ttl_ms = millis, "SET");
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        self.pool.incr(key).await.map_err(|e| {
            if e.details().contains("not an integer") {
                Error::MalformedVersion {
                    key: key.to_string(),
                    raw: e.details().to_string(),
                }
            } else {
                map_err(e)
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _: i64 = self.pool.del(key).await.map_err(map_err)?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let _: String = self.pool.ping(None).await.map_err(map_err)?;
        Ok(())
    }
}

fn map_err(err: RedisError) -> Error {
    match err.kind() {
        ErrorKind::IO | ErrorKind::Timeout | ErrorKind::Canceled => Error::Network(err.to_string()),
        ErrorKind::Config | ErrorKind::Url | ErrorKind::Tls => Error::Config(err.to_string()),
        _ => Error::Store(err.to_string()),
    }
}

/// Parse a `host:port` string. If the port is omitted, defaults to `6379`.
pub fn parse_host_port(endpoint: &str) -> Result<(&str, u16)> {
    let endpoint = endpoint.split('/').next().unwrap_or(endpoint);

    if let Some((host, port_str)) = endpoint.rsplit_once(':') {
        let port: u16 = port_str
            .parse()
            .map_err(|_| Error::Config(format!("invalid port in endpoint: {endpoint}")))?;
        Ok((host, port))
    } else {
        Ok((endpoint, 6379))
    }
}
