//! # breaker-core
//!
//! State-transition engine and storage backends for a circuit breaker that
//! protects callers from repeatedly invoking a failing dependency.
//!
//! ## Architecture
//!
//! ```text
//! caller ──► CircuitBreaker::is_available ──► StateStore::get_state
//!        ──► protected operation
//!        ──► CircuitBreaker::done ──► StateStore::failure / success
//! ```
//!
//! Two [`StateStore`](resilience::StateStore) implementations share the same
//! observable semantics:
//!
//! - [`MemoryStateStore`](resilience::MemoryStateStore): lock-free atomic
//!   counters scoped to one service in one process.
//! - [`DistributedStateStore`](resilience::DistributedStateStore): a hash key
//!   per service on a shared key-value store (Redis in production) whose
//!   expiry drives the Open → Closed recovery.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use breaker_core::{BreakerOptions, CircuitBreaker};
//!
//! let options = BreakerOptions::builder().service("payments").build();
//! let breaker = CircuitBreaker::in_memory(options);
//!
//! match breaker.call(|| async { charge_card().await }).await {
//!     Ok(receipt) => { /* ... */ }
//!     Err(e) if e.is_circuit_open() => { /* shed load */ }
//!     Err(e) => { /* dependency error, already recorded */ }
//! }
//! ```

pub mod clock;
pub mod config;
pub mod errors;
pub mod logging;
pub mod resilience;

pub use clock::{Clock, SystemClock};
pub use config::{BreakerConfig, BreakerDefaults, BreakerOptions, ServiceBreakerConfig};
pub use errors::{BreakerError, ConfigError, LoggingError, StoreError, StoreResult};
pub use resilience::{
    only_these_errors, BreakerLogger, CircuitBreaker, CircuitBreakerBehavior, CircuitBreakerStat,
    CircuitState, DistributedStateStore, HashCounterBackend, LocalHashBackend, MemoryStateStore,
    StateStore, TracingLogger, FAILURES_FIELD, SUCCESS_FIELD,
};

#[cfg(feature = "redis-store")]
pub use resilience::{RedisHashBackend, RedisStateStore};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
