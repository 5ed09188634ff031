//! Redis implementation of [`HashCounterBackend`].

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::fmt;
use std::time::Duration;

use super::HashCounterBackend;
use crate::errors::StoreResult;
use crate::resilience::window::duration_millis;

/// Redis hash backend
///
/// `ConnectionManager` multiplexes commands over one connection and
/// reconnects on failure; clones share that connection, so each call works
/// on its own clone.
#[derive(Clone)]
pub struct RedisHashBackend {
    connection: ConnectionManager,
}

impl RedisHashBackend {
    /// Connect to the Redis server at `url` (`redis://host:port/db`)
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::debug!(url = url, "Connected Redis breaker backend");
        Ok(Self { connection })
    }

    /// Wrap an existing connection manager
    pub fn from_connection_manager(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

impl fmt::Debug for RedisHashBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisHashBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl HashCounterBackend for RedisHashBackend {
    async fn increment_and_expire(
        &self,
        key: &str,
        field: &str,
        delta: i64,
        clear_field: &str,
        ttl: Duration,
    ) -> StoreResult<()> {
        let mut connection = self.connection.clone();
        redis::pipe()
            .atomic()
            .cmd("HINCRBY")
            .arg(key)
            .arg(field)
            .arg(delta)
            .ignore()
            .cmd("HDEL")
            .arg(key)
            .arg(clear_field)
            .ignore()
            .cmd("PEXPIRE")
            .arg(key)
            .arg(duration_millis(ttl))
            .ignore()
            .query_async::<()>(&mut connection)
            .await?;
        Ok(())
    }

    async fn increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        let mut connection = self.connection.clone();
        let value = redis::cmd("HINCRBY")
            .arg(key)
            .arg(field)
            .arg(delta)
            .query_async::<i64>(&mut connection)
            .await?;
        Ok(value)
    }

    async fn time_to_live(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut connection = self.connection.clone();
        // -2: key missing, -1: key has no expiry
        let millis = redis::cmd("PTTL")
            .arg(key)
            .query_async::<i64>(&mut connection)
            .await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn read_counter(&self, key: &str, field: &str) -> StoreResult<Option<i64>> {
        let mut connection = self.connection.clone();
        let value = redis::cmd("HGET")
            .arg(key)
            .arg(field)
            .query_async::<Option<i64>>(&mut connection)
            .await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut connection = self.connection.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut connection)
            .await?;
        Ok(())
    }
}
