//! # Resilience
//!
//! Circuit breaker facade, the state store contract, and its two backends.
//!
//! ## State Machine
//!
//! ```text
//!            failures >= failure_threshold
//!   Closed ────────────────────────────────► Open
//!     ▲                                       │
//!     │ open_window elapsed since last        │ final half_open_window
//!     │ failure, or successes >=              ▼ of the open period
//!     │ success_threshold                  HalfOpen
//!     └───────────────────────────────────────┘
//! ```
//!
//! Any state returns to the baseline on an explicit `reset`.

pub mod backend;
mod behavior;
mod breaker;
mod distributed;
mod logger;
mod memory;
mod metrics;
mod state;
mod store;
pub(crate) mod window;

pub use backend::{HashCounterBackend, LocalHashBackend};
pub use behavior::CircuitBreakerBehavior;
pub use breaker::{only_these_errors, CircuitBreaker};
pub use distributed::{DistributedStateStore, FAILURES_FIELD, SUCCESS_FIELD};
pub use logger::{BreakerLogger, TracingLogger};
pub use memory::MemoryStateStore;
pub use metrics::CircuitBreakerStat;
pub use state::CircuitState;
pub use store::StateStore;

#[cfg(feature = "redis-store")]
pub use backend::RedisHashBackend;
#[cfg(feature = "redis-store")]
pub use distributed::RedisStateStore;
