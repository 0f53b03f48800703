//! Redis implementation of the lock store contract
//!
//! - set-if-absent: `SET key value NX EX ttl`
//! - read: `GET key`
//! - compare-and-delete: a server-side script that deletes the key only if
//!   it still holds the expected value, evaluated atomically by Redis

use std::time::Duration;

use async_trait::async_trait;
use kvlock::{KeyValueStore, Result, StoreError, TxnOutcome};
use redis::aio::MultiplexedConnection;
use redis::{ErrorKind, RedisError, RedisResult, Script};
use tracing::{debug, info};

use crate::config::RedisStoreConfig;

const COMPARE_AND_DELETE: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

/// Store backed by a Redis server over a multiplexed async connection
pub struct RedisStore {
    connection: MultiplexedConnection,
    response_timeout: Duration,
    release_script: Script,
}

impl RedisStore {
    /// Connect using `config`; the connect itself is bounded by the response timeout
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(map_redis_error)?;
        let timeout = config.response_timeout();

        let connection = match tokio::time::timeout(
            timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(connection) => connection.map_err(map_redis_error)?,
            Err(_) => return Err(StoreError::Timeout),
        };

        info!(
            timeout_ms = config.response_timeout_ms,
            "Connected to Redis lock store"
        );
        Ok(Self::from_connection(connection, timeout))
    }

    /// Wrap an existing connection
    pub fn from_connection(connection: MultiplexedConnection, response_timeout: Duration) -> Self {
        Self {
            connection,
            response_timeout,
            release_script: Script::new(COMPARE_AND_DELETE),
        }
    }

    async fn bounded<T>(&self, request: impl Future<Output = RedisResult<T>>) -> Result<T> {
        match tokio::time::timeout(self.response_timeout, request).await {
            Ok(reply) => reply.map_err(map_redis_error),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool> {
        let mut conn = self.connection.clone();
        // Nil reply means the key already exists
        let reply: Option<String> = self
            .bounded(
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_seconds)
                    .query_async(&mut conn),
            )
            .await?;

        debug!(key = %key, written = reply.is_some(), "SET NX EX");
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        self.bounded(redis::cmd("GET").arg(key).query_async(&mut conn))
            .await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<TxnOutcome> {
        let mut conn = self.connection.clone();
        let deleted: i64 = self
            .bounded(
                self.release_script
                    .key(key)
                    .arg(expected)
                    .invoke_async(&mut conn),
            )
            .await?;

        Ok(if deleted > 0 {
            TxnOutcome::Committed
        } else {
            TxnOutcome::Aborted
        })
    }
}

/// Translate a client error into the store error taxonomy
pub fn map_redis_error(err: RedisError) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error() {
        StoreError::Connection(err.to_string())
    } else if matches!(err.kind(), ErrorKind::TypeError | ErrorKind::ResponseError) {
        StoreError::Protocol(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}
