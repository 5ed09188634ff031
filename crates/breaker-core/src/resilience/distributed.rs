//! # Distributed State Store
//!
//! Breaker state shared between processes through a hash key per service:
//!
//! ```text
//! <storage_prefix>:<service>      (expires open_window after the last failure)
//!   ├── failures   integer counter
//!   └── success    integer counter
//! ```
//!
//! No state field is persisted. The state is derived on every read from the
//! key's remaining time to live and the failure counter; a missing or
//! expired key is the only Closed signal.
//!
//! ## Race Windows
//!
//! Each backend call is atomic on its own, but two sequences are not:
//! - `get_state` reads the TTL and then the failure counter. A concurrent
//!   `reset` or `failure` between the two reads can yield a state that
//!   matches neither the before nor the after picture.
//! - `success` increments and then, in a second round trip, deletes the key
//!   when the threshold is reached. Readers in between see the pre-reset state.
//!
//! These windows are accepted; no distributed locking is attempted.

use async_trait::async_trait;
use std::future::Future;

use super::backend::HashCounterBackend;
use super::window::{duration_millis, OpenWindowPosition};
use crate::config::BreakerOptions;
use crate::errors::{StoreError, StoreResult};
use crate::resilience::{CircuitState, StateStore};

/// Hash field counting failures
pub const FAILURES_FIELD: &str = "failures";

/// Hash field counting successes
pub const SUCCESS_FIELD: &str = "success";

/// Store backed by a shared key-value backend
#[derive(Debug)]
pub struct DistributedStateStore<B> {
    backend: B,
    options: BreakerOptions,
    key: String,
}

impl<B: HashCounterBackend> DistributedStateStore<B> {
    pub fn new(backend: B, options: BreakerOptions) -> Self {
        let key = options.storage_key();
        Self {
            backend,
            options,
            key,
        }
    }

    /// Namespaced key holding this service's counters
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &BreakerOptions {
        &self.options
    }

    /// Apply the configured per-command deadline
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match self.options.command_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| StoreError::Timeout { operation, timeout })?,
            None => call.await,
        }
    }
}

#[async_trait]
impl<B: HashCounterBackend> StateStore for DistributedStateStore<B> {
    async fn failure(&self, delta: u32) -> StoreResult<()> {
        self.bounded(
            "record failure",
            self.backend.increment_and_expire(
                &self.key,
                FAILURES_FIELD,
                i64::from(delta),
                SUCCESS_FIELD,
                self.options.open_window,
            ),
        )
        .await
    }

    async fn success(&self, delta: u32) -> StoreResult<()> {
        let successes = self
            .bounded(
                "record success",
                self.backend
                    .increment(&self.key, SUCCESS_FIELD, i64::from(delta)),
            )
            .await?;

        if self
            .options
            .reached_success_threshold(u64::try_from(successes).unwrap_or(0))
        {
            return self.reset().await;
        }
        Ok(())
    }

    async fn get_state(&self) -> StoreResult<CircuitState> {
        let ttl = self
            .bounded("read ttl", self.backend.time_to_live(&self.key))
            .await?;
        let Some(remaining) = ttl else {
            return Ok(CircuitState::Closed);
        };

        match OpenWindowPosition::from_remaining_millis(
            duration_millis(remaining),
            self.options.half_open_window,
        ) {
            OpenWindowPosition::Expired => return Ok(CircuitState::Closed),
            OpenWindowPosition::HalfOpen => return Ok(CircuitState::HalfOpen),
            OpenWindowPosition::Open => {}
        }

        let failures = self
            .bounded(
                "read failures",
                self.backend.read_counter(&self.key, FAILURES_FIELD),
            )
            .await?;
        let failures = failures.and_then(|count| u64::try_from(count).ok());

        match failures {
            Some(count) if self.options.reached_failure_threshold(count) => Ok(CircuitState::Open),
            _ => Ok(CircuitState::Closed),
        }
    }

    async fn reset(&self) -> StoreResult<()> {
        self.bounded("reset", self.backend.delete(&self.key)).await
    }
}

#[cfg(feature = "redis-store")]
mod redis_store {
    use super::DistributedStateStore;
    use crate::config::BreakerOptions;
    use crate::errors::StoreResult;
    use crate::resilience::backend::RedisHashBackend;

    /// Distributed store on Redis
    pub type RedisStateStore = DistributedStateStore<RedisHashBackend>;

    impl DistributedStateStore<RedisHashBackend> {
        /// Connect to Redis at `url` and scope a store to `options.service`
        pub async fn connect(url: &str, options: BreakerOptions) -> StoreResult<Self> {
            let backend = RedisHashBackend::connect(url).await?;
            Ok(Self::new(backend, options))
        }
    }
}

#[cfg(feature = "redis-store")]
pub use redis_store::RedisStateStore;
