//! # State Store Contract
//!
//! The four operations every backend implements. The facade only talks to a
//! backend through this trait, so backends are interchangeable per breaker.
//!
//! One store instance is scoped to exactly one protected service. Sharing a
//! store between logically distinct services merges their counters; this is
//! a caller contract and is not guarded internally.
//!
//! ## Cancellation
//!
//! All methods are `async`. Dropping the returned future cancels an
//! in-flight remote call; remote backends additionally honor a configured
//! per-command deadline. The in-memory backend never suspends.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::StoreResult;
use crate::resilience::CircuitState;

/// Storage of circuit breaker state for a single service
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `Arc<dyn StateStore>`.
#[async_trait]
pub trait StateStore: Send + Sync + Debug {
    /// Record `delta` failures
    async fn failure(&self, delta: u32) -> StoreResult<()>;

    /// Record `delta` successes
    async fn success(&self, delta: u32) -> StoreResult<()>;

    /// Current circuit state
    async fn get_state(&self) -> StoreResult<CircuitState>;

    /// Return to the baseline state with all counters zeroed
    async fn reset(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time proof that StateStore is object-safe
    fn _assert_object_safe(_: &dyn StateStore) {}
}
