//! # In-Memory State Store
//!
//! Lock-free counters for one service in one process.
//!
//! ## Concurrency
//!
//! Every field is its own atomic; there is no lock around the composite.
//! Individual updates are atomic, but a reader that loads several fields
//! (`get_state` reading the state and then the failure timestamp, or a
//! metrics reader calling the accessors one after another) can observe a
//! combination that no single update produced. For example, a `failure`
//! racing a `reset` may leave the state Open with a zeroed failure count.
//! Such torn combinations heal on the next expiry or threshold check and are
//! accepted in exchange for never blocking a caller.
//!
//! ## State Advancement
//!
//! The state field is advanced eagerly:
//! - `failure`: Open once the failure count reaches the threshold.
//! - `success` (only while not Closed): Closed once the success count reaches
//!   the threshold or the open period has elapsed; HalfOpen inside the final
//!   half-open window.
//! - `get_state`: loads the field; while not Closed and a failure is on
//!   record, applies the same time rules so an idle circuit still recovers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use super::window::OpenWindowPosition;
use crate::clock::{Clock, SystemClock};
use crate::config::BreakerOptions;
use crate::errors::StoreResult;
use crate::resilience::{CircuitState, StateStore};

/// Marker for "no failure on record"
const NO_FAILURE: i64 = 0;

/// Memory-backed store; do not share one instance between services.
#[derive(Debug)]
pub struct MemoryStateStore {
    options: BreakerOptions,
    clock: Arc<dyn Clock>,
    failures: AtomicU64,
    successes: AtomicU64,
    /// Unix milliseconds of the most recent failure, `NO_FAILURE` when none
    last_failure_at: AtomicI64,
    state: AtomicU8,
}

impl MemoryStateStore {
    /// Create a store using the system clock
    pub fn new(options: BreakerOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source
    pub fn with_clock(options: BreakerOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            options,
            clock,
            failures: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            last_failure_at: AtomicI64::new(NO_FAILURE),
            state: AtomicU8::new(CircuitState::Closed.into()),
        }
    }

    /// Options this store was built with
    pub fn options(&self) -> &BreakerOptions {
        &self.options
    }

    /// Failures recorded since the last transition into Closed
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }

    /// Successes recorded since the last transition into Closed or the last failure
    pub fn success_count(&self) -> u64 {
        self.successes.load(Ordering::Acquire)
    }

    /// Time of the most recent failure, if one is on record
    pub fn last_failure_at(&self) -> Option<DateTime<Utc>> {
        match self.last_failure_at.load(Ordering::Acquire) {
            NO_FAILURE => None,
            millis => DateTime::from_timestamp_millis(millis),
        }
    }

    /// The stored state field, without applying any time rules
    pub fn stored_state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Record failures without going through the async trait
    pub fn record_failure(&self, delta: u32) {
        let delta = u64::from(delta);
        self.last_failure_at
            .store(self.clock.now_millis(), Ordering::Release);
        self.successes.store(0, Ordering::Release);

        let failures = self.failures.fetch_add(delta, Ordering::AcqRel) + delta;
        if self.options.reached_failure_threshold(failures) {
            self.store_state(CircuitState::Open);
        }
    }

    /// Record successes without going through the async trait
    pub fn record_success(&self, delta: u32) {
        if self.stored_state() == CircuitState::Closed {
            return;
        }

        let delta = u64::from(delta);
        let successes = self.successes.fetch_add(delta, Ordering::AcqRel) + delta;
        if self.options.reached_success_threshold(successes) {
            self.reset_to(CircuitState::Closed);
            return;
        }

        let last_failure = self.last_failure_at.load(Ordering::Acquire);
        match self.position(last_failure) {
            OpenWindowPosition::Expired => self.reset_to(CircuitState::Closed),
            OpenWindowPosition::HalfOpen => self.store_state(CircuitState::HalfOpen),
            OpenWindowPosition::Open => {}
        }
    }

    /// Current state, applying expiry and half-open rules to a non-Closed state
    pub fn load_state(&self) -> CircuitState {
        let state = self.stored_state();
        if state == CircuitState::Closed {
            return state;
        }

        let last_failure = self.last_failure_at.load(Ordering::Acquire);
        if last_failure == NO_FAILURE {
            // Baseline set by reset; nothing to age out
            return state;
        }

        match self.position(last_failure) {
            OpenWindowPosition::Expired => {
                self.expire(last_failure);
                CircuitState::Closed
            }
            OpenWindowPosition::HalfOpen => {
                let _ = self.state.compare_exchange(
                    CircuitState::Open.into(),
                    CircuitState::HalfOpen.into(),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                CircuitState::HalfOpen
            }
            OpenWindowPosition::Open => state,
        }
    }

    /// Reset to the configured baseline state with zeroed counters
    pub fn reset_counters(&self) {
        self.reset_to(self.options.fallback_state);
    }

    fn position(&self, last_failure: i64) -> OpenWindowPosition {
        if last_failure == NO_FAILURE {
            return OpenWindowPosition::Expired;
        }
        OpenWindowPosition::at(
            last_failure,
            self.clock.now_millis(),
            self.options.open_window,
            self.options.half_open_window,
        )
    }

    /// Close an expired circuit unless a newer failure landed meanwhile
    fn expire(&self, observed_failure_at: i64) {
        if self
            .last_failure_at
            .compare_exchange(
                observed_failure_at,
                NO_FAILURE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            self.reset_to(CircuitState::Closed);
        }
    }

    fn reset_to(&self, state: CircuitState) {
        self.store_state(state);
        self.successes.store(0, Ordering::Release);
        self.failures.store(0, Ordering::Release);
        self.last_failure_at.store(NO_FAILURE, Ordering::Release);
    }

    fn store_state(&self, state: CircuitState) {
        self.state.store(state.into(), Ordering::Release);
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn failure(&self, delta: u32) -> StoreResult<()> {
        self.record_failure(delta);
        Ok(())
    }

    async fn success(&self, delta: u32) -> StoreResult<()> {
        self.record_success(delta);
        Ok(())
    }

    async fn get_state(&self) -> StoreResult<CircuitState> {
        Ok(self.load_state())
    }

    async fn reset(&self) -> StoreResult<()> {
        self.reset_counters();
        Ok(())
    }
}
