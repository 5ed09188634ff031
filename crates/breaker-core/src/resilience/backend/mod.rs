//! # Hash Counter Backends
//!
//! The key-value primitives the distributed store needs: integer fields in a
//! hash stored under one key, with a key-level expiry. Each method is one
//! atomic operation on the backend; nothing links two calls together.
//!
//! - [`RedisHashBackend`]: Redis via a multiplexed `ConnectionManager`
//!   (feature `redis-store`).
//! - [`LocalHashBackend`]: an in-process hash map with clock-driven expiry.

mod local;
#[cfg(feature = "redis-store")]
mod redis;

pub use local::LocalHashBackend;
#[cfg(feature = "redis-store")]
pub use self::redis::RedisHashBackend;

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::StoreResult;

/// Integer hash fields under an expiring key
#[async_trait]
pub trait HashCounterBackend: Send + Sync + Debug {
    /// In one atomic batch: add `delta` to `field`, remove `clear_field`, and
    /// set the key to expire after `ttl`.
    async fn increment_and_expire(
        &self,
        key: &str,
        field: &str,
        delta: i64,
        clear_field: &str,
        ttl: Duration,
    ) -> StoreResult<()>;

    /// Add `delta` to `field`, returning the new value. Creates the key
    /// (without expiry) when missing.
    async fn increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64>;

    /// Remaining time to live; `None` when the key is missing or never expires
    async fn time_to_live(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Value of `field`; `None` when the key or field is missing
    async fn read_counter(&self, key: &str, field: &str) -> StoreResult<Option<i64>>;

    /// Remove the key
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
