//! # Circuit Breaker Facade
//!
//! The object callers hold. It asks the store whether a call may proceed,
//! reports outcomes back, and keeps lifetime totals for [`CircuitBreaker::stat`].
//!
//! Store failures never reach the caller from here. They are reported to the
//! [`BreakerLogger`] and the facade falls back to `fallback_state` for
//! decisions, or drops the accounting update.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BreakerOptions;
use crate::errors::BreakerError;
use crate::resilience::{
    BreakerLogger, CircuitBreakerBehavior, CircuitBreakerStat, CircuitState, MemoryStateStore,
    StateStore, TracingLogger,
};

/// Circuit breaker protecting one service
///
/// Cheap to share behind an `Arc`; every method takes `&self` and is safe
/// to call from many tasks at once.
#[derive(Debug)]
pub struct CircuitBreaker {
    options: BreakerOptions,
    store: Arc<dyn StateStore>,
    logger: Arc<dyn BreakerLogger>,
    failure_total: AtomicU64,
    success_total: AtomicU64,
}

impl CircuitBreaker {
    /// Create a breaker over `store`, logging through `tracing`
    pub fn new(options: BreakerOptions, store: Arc<dyn StateStore>) -> Self {
        Self::with_logger(options, store, Arc::new(TracingLogger))
    }

    pub fn with_logger(
        options: BreakerOptions,
        store: Arc<dyn StateStore>,
        logger: Arc<dyn BreakerLogger>,
    ) -> Self {
        logger.info(&options.service, "circuit breaker created");
        tracing::debug!(
            service = %options.service,
            failure_threshold = options.failure_threshold,
            success_threshold = options.success_threshold,
            open_window = ?options.open_window,
            half_open_window = ?options.half_open_window,
            fallback_state = %options.fallback_state,
            "Circuit breaker initialized"
        );
        if options.half_open_window > options.open_window {
            logger.warn(
                &options.service,
                "half-open window is longer than the open window; circuit will never read Open",
            );
        }

        Self {
            options,
            store,
            logger,
            failure_total: AtomicU64::new(0),
            success_total: AtomicU64::new(0),
        }
    }

    /// Create a breaker with its own in-process store
    pub fn in_memory(options: BreakerOptions) -> Self {
        let store = Arc::new(MemoryStateStore::new(options.clone()));
        Self::new(options, store)
    }

    /// Name of the protected service
    pub fn name(&self) -> &str {
        &self.options.service
    }

    pub fn options(&self) -> &BreakerOptions {
        &self.options
    }

    /// The store this breaker reports to
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Current state, or the fallback state when the store cannot be read
    pub async fn state(&self) -> CircuitState {
        match self.store.get_state().await {
            Ok(state) => state,
            Err(e) => {
                self.logger
                    .error(self.name(), "failed to read circuit state", &e);
                self.options.fallback_state
            }
        }
    }

    /// Whether the current state equals `state`.
    ///
    /// On a store failure this compares against the fallback state instead.
    pub async fn is(&self, state: CircuitState) -> bool {
        match self.store.get_state().await {
            Ok(current) => current == state,
            Err(e) => {
                self.logger
                    .error(self.name(), "failed to check circuit state", &e);
                state == self.options.fallback_state
            }
        }
    }

    /// Whether a call may proceed: true unless the circuit is Open
    pub async fn is_available(&self) -> bool {
        match self.store.get_state().await {
            Ok(state) => state.allows_requests(),
            Err(e) => {
                self.logger
                    .error(self.name(), "failed to check circuit availability", &e);
                let allowed = self.options.fallback_state.allows_requests();
                if !allowed {
                    self.logger.warn(
                        self.name(),
                        "store unreachable; fallback state is denying traffic",
                    );
                }
                allowed
            }
        }
    }

    /// Report the outcome of an operation dispatched by the caller
    pub async fn done<T, E>(&self, outcome: &Result<T, E>) {
        if outcome.is_ok() {
            self.record_success().await;
        } else {
            self.record_failure().await;
        }
    }

    /// Record one success.
    ///
    /// Successes only matter while the circuit is not Closed, so the store is
    /// read first and the update is skipped when it reports Closed.
    pub async fn record_success(&self) {
        self.success_total.fetch_add(1, Ordering::Relaxed);

        let state = self.state().await;
        if state == CircuitState::Closed {
            return;
        }

        if let Err(e) = self.store.success(1).await {
            self.logger
                .error(self.name(), "failed to record success", &e);
        }
    }

    /// Record one failure
    pub async fn record_failure(&self) {
        self.failure_total.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self.store.failure(1).await {
            self.logger
                .error(self.name(), "failed to record failure", &e);
        }
    }

    /// Return the store to its baseline state
    pub async fn reset(&self) {
        if let Err(e) = self.store.reset().await {
            self.logger
                .error(self.name(), "failed to reset circuit state", &e);
        }
    }

    /// Run `operation` if the circuit allows it and record its outcome.
    ///
    /// Returns [`BreakerError::CircuitOpen`] without invoking `operation`
    /// when the circuit is Open. Otherwise the operation runs exactly once
    /// and its own error comes back untouched in [`BreakerError::Operation`].
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.call_filtered(operation, |_| true).await
    }

    /// Like [`call`](Self::call), but an operation error is only recorded as
    /// a failure when `counts_as_failure` accepts it. Rejected errors are
    /// recorded as successes and still returned to the caller.
    pub async fn call_filtered<F, Fut, T, E, P>(
        &self,
        operation: F,
        counts_as_failure: P,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnOnce(&E) -> bool,
    {
        if !self.is_available().await {
            tracing::debug!(service = self.name(), "circuit open, rejecting call");
            return Err(BreakerError::circuit_open(self.name()));
        }

        match operation().await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(e) => {
                if counts_as_failure(&e) {
                    self.record_failure().await;
                } else {
                    self.record_success().await;
                }
                Err(BreakerError::Operation(e))
            }
        }
    }

    /// Current state with this breaker's lifetime totals
    pub async fn stat(&self) -> CircuitBreakerStat {
        CircuitBreakerStat {
            state: self.state().await,
            failure_count: self.failure_total.load(Ordering::Relaxed),
            success_count: self.success_total.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl CircuitBreakerBehavior for CircuitBreaker {
    fn name(&self) -> &str {
        CircuitBreaker::name(self)
    }

    async fn state(&self) -> CircuitState {
        CircuitBreaker::state(self).await
    }

    async fn is_available(&self) -> bool {
        CircuitBreaker::is_available(self).await
    }

    async fn record_success(&self) {
        CircuitBreaker::record_success(self).await;
    }

    async fn record_failure(&self) {
        CircuitBreaker::record_failure(self).await;
    }

    async fn reset(&self) {
        CircuitBreaker::reset(self).await;
    }

    async fn stat(&self) -> CircuitBreakerStat {
        CircuitBreaker::stat(self).await
    }
}

/// Predicate for [`CircuitBreaker::call_filtered`] that counts only the
/// listed errors as failures
///
/// ```rust,ignore
/// let breaker_errors = only_these_errors(vec![ApiError::Timeout, ApiError::Unavailable]);
/// breaker.call_filtered(|| client.fetch(), breaker_errors).await
/// ```
pub fn only_these_errors<E: PartialEq>(errors: Vec<E>) -> impl Fn(&E) -> bool {
    move |error| errors.contains(error)
}
