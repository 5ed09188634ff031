//! # Breaker Options
//!
//! Runtime options for one breaker protecting one service. Immutable after
//! construction; shared by the facade and the store built for it.

use std::time::Duration;

use bon::Builder;

use crate::resilience::CircuitState;

/// Default time an Open state is honored from the last failure
pub const DEFAULT_OPEN_WINDOW: Duration = Duration::from_secs(60);

/// Default trailing slice of the open window that reads as HalfOpen
pub const DEFAULT_HALF_OPEN_WINDOW: Duration = Duration::from_secs(30);

/// Default failures needed to open the circuit
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 50;

/// Default successes needed, while not Closed, to close the circuit early
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 10;

/// Default namespace for distributed store keys
pub const DEFAULT_STORAGE_PREFIX: &str = "circuitBreaker";

/// Options for a single circuit breaker
///
/// ```rust,ignore
/// let options = BreakerOptions::builder()
///     .service("payments")
///     .failure_threshold(5)
///     .open_window(Duration::from_secs(60))
///     .half_open_window(Duration::from_secs(30))
///     .build();
/// ```
#[derive(Debug, Clone, Builder)]
pub struct BreakerOptions {
    /// Name of the protected service; also the distributed key suffix
    #[builder(into)]
    pub service: String,

    /// Namespace for distributed keys (`"<prefix>:<service>"`)
    #[builder(into, default = DEFAULT_STORAGE_PREFIX.to_string())]
    pub storage_prefix: String,

    /// Baseline state after `reset`, and the state assumed when the store is unreachable
    #[builder(default)]
    pub fallback_state: CircuitState,

    /// Failures required to force Open (inclusive)
    #[builder(default = DEFAULT_FAILURE_THRESHOLD)]
    pub failure_threshold: u32,

    /// Successes required while not Closed to force Closed (inclusive).
    /// Zero disables early recovery; only the open window expiry closes the circuit.
    #[builder(default = DEFAULT_SUCCESS_THRESHOLD)]
    pub success_threshold: u32,

    /// How long an Open state is honored from the last recorded failure
    #[builder(default = DEFAULT_OPEN_WINDOW)]
    pub open_window: Duration,

    /// Final stretch of the open window during which the state reads HalfOpen
    #[builder(default = DEFAULT_HALF_OPEN_WINDOW)]
    pub half_open_window: Duration,

    /// Deadline applied to each remote store call
    pub command_timeout: Option<Duration>,
}

impl BreakerOptions {
    /// Distributed store key for this service
    pub fn storage_key(&self) -> String {
        namespace(&self.storage_prefix, &self.service)
    }

    /// Whether enough successes have accumulated to close the circuit early
    pub(crate) fn reached_success_threshold(&self, successes: u64) -> bool {
        self.success_threshold > 0 && successes >= u64::from(self.success_threshold)
    }

    /// Whether enough failures have accumulated to open the circuit
    pub(crate) fn reached_failure_threshold(&self, failures: u64) -> bool {
        failures >= u64::from(self.failure_threshold)
    }
}

/// Build the namespaced key for a service
pub fn namespace(prefix: &str, service: &str) -> String {
    format!("{prefix}:{service}")
}
