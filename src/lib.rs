//! # breaker
//!
//! Circuit breaker for guarding calls to a failing dependency, with an
//! in-process store for single instances and a Redis-backed store for
//! fleets that share breaker state.
//!
//! Everything lives in [`breaker_core`]; this crate re-exports it.
//!
//! ```rust,ignore
//! use breaker::{BreakerOptions, CircuitBreaker, RedisStateStore};
//! use std::sync::Arc;
//!
//! let options = BreakerOptions::builder()
//!     .service("payments")
//!     .failure_threshold(5)
//!     .build();
//! let store = RedisStateStore::connect("redis://127.0.0.1:6379", options.clone()).await?;
//! let breaker = CircuitBreaker::new(options, Arc::new(store));
//!
//! if breaker.is_available().await {
//!     let outcome = charge_card().await;
//!     breaker.done(&outcome).await;
//! }
//! ```

pub use breaker_core::*;
