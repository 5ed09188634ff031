//! # Configuration
//!
//! [`BreakerOptions`] are what a breaker and its store run with. They can be
//! built directly or derived from a [`BreakerConfig`] loaded from TOML.

mod circuit_breaker;
mod options;

pub use circuit_breaker::{BreakerConfig, BreakerDefaults, ServiceBreakerConfig};
pub use options::{
    namespace, BreakerOptions, DEFAULT_FAILURE_THRESHOLD, DEFAULT_HALF_OPEN_WINDOW,
    DEFAULT_OPEN_WINDOW, DEFAULT_STORAGE_PREFIX, DEFAULT_SUCCESS_THRESHOLD,
};
