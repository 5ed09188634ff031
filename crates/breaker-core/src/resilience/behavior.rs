//! # Circuit Breaker Behavior Trait
//!
//! Object-safe view of a breaker for code that needs uniform access to many
//! breakers (health reporting, admin endpoints) without knowing how each one
//! stores its state. Concrete [`CircuitBreaker`](crate::resilience::CircuitBreaker)
//! methods are preferred on hot paths.

use async_trait::async_trait;

use crate::resilience::{CircuitBreakerStat, CircuitState};

/// Uniform interface over circuit breakers.
///
/// - **Pre-flight check**: `is_available()` gates calls before attempting work
/// - **Recording**: `record_success()` / `record_failure()` after work
/// - **Observability**: `name()`, `state()`, `stat()`
/// - **Recovery**: `reset()`
///
/// None of these surface store errors; they are logged and absorbed.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn CircuitBreakerBehavior`.
#[async_trait]
pub trait CircuitBreakerBehavior: Send + Sync + std::fmt::Debug {
    /// Name of the protected service
    fn name(&self) -> &str;

    /// Current circuit state
    async fn state(&self) -> CircuitState;

    /// Whether the next call may proceed
    async fn is_available(&self) -> bool;

    /// Record a successful operation
    async fn record_success(&self);

    /// Record a failed operation
    async fn record_failure(&self);

    /// Return the store to its baseline state
    async fn reset(&self);

    /// Snapshot for observability
    async fn stat(&self) -> CircuitBreakerStat;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time proof that CircuitBreakerBehavior is object-safe
    fn _assert_object_safe(_: &dyn CircuitBreakerBehavior) {}
}
