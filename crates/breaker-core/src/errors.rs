//! # Error Types
//!
//! Three categories flow through the breaker:
//!
//! - **Operation errors** produced by the caller's own work, returned untouched
//!   inside [`BreakerError::Operation`].
//! - **Store errors** ([`StoreError`]) from a backend. Backends return them;
//!   the facade logs and absorbs them.
//! - **Circuit-open rejections** ([`BreakerError::CircuitOpen`]), a policy
//!   decision rather than a dependency failure.

use std::time::Duration;
use thiserror::Error;

/// Store operation result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a [`StateStore`](crate::resilience::StateStore) backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "redis-store")]
    #[error("Redis command failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store operation '{operation}' timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error for non-Redis stores
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Whether the store call hit its deadline
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            StoreError::Timeout { .. } => true,
            #[cfg(feature = "redis-store")]
            StoreError::Redis(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Outcome of [`CircuitBreaker::call`](crate::resilience::CircuitBreaker::call)
/// when it does not produce the operation's value.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit denied the call; the operation was never invoked.
    #[error("circuit breaker for '{service}' is open: dependency is not accepting new requests")]
    CircuitOpen { service: String },

    /// The operation ran and returned its own error.
    #[error(transparent)]
    Operation(E),
}

impl<E> BreakerError<E> {
    /// Create the circuit-open sentinel for a service
    pub fn circuit_open(service: impl Into<String>) -> Self {
        Self::CircuitOpen {
            service: service.into(),
        }
    }

    /// Check whether this is the circuit-open sentinel
    #[must_use]
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, BreakerError::CircuitOpen { .. })
    }

    /// The operation's own error, if the operation ran
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::CircuitOpen { .. } => None,
        }
    }

    /// Borrow the operation's own error, if the operation ran
    pub fn operation(&self) -> Option<&E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::CircuitOpen { .. } => None,
        }
    }
}

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load breaker configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid breaker configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Tracing subscriber installation failure
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}
