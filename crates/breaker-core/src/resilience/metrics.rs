//! # Circuit Breaker Stat
//!
//! Point-in-time snapshot of a breaker for observability. The counts are the
//! facade's lifetime totals and never reset; they are unrelated to the
//! store's transition counters.

use crate::resilience::CircuitState;
use serde::{Deserialize, Serialize};

/// Snapshot returned by [`CircuitBreaker::stat`](crate::resilience::CircuitBreaker::stat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CircuitBreakerStat {
    /// Current state (fallback state when the store could not be read)
    pub state: CircuitState,

    /// Failures reported through this breaker since construction
    pub failure_count: u64,

    /// Successes reported through this breaker since construction
    pub success_count: u64,
}

impl CircuitBreakerStat {
    /// Total outcomes reported through this breaker
    pub fn total_calls(&self) -> u64 {
        self.failure_count.saturating_add(self.success_count)
    }

    /// Lifetime failure rate (0.0 to 1.0)
    pub fn failure_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            return 0.0;
        }
        self.failure_count as f64 / total as f64
    }

    /// Whether the breaker currently lets traffic through
    pub fn is_healthy(&self) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => true, // Half-open is attempting recovery
        }
    }

    /// Get human-readable state description
    pub fn state_description(&self) -> &'static str {
        match self.state {
            CircuitState::Closed => "Healthy - Normal operation",
            CircuitState::Open => "Failing - Rejecting all calls",
            CircuitState::HalfOpen => "Recovering - Testing system health",
        }
    }

    /// Format the snapshot for logging
    pub fn format_summary(&self) -> String {
        format!(
            "State: {} | Calls: {} | Failures: {} | Successes: {} | Failure rate: {:.1}%",
            self.state_description(),
            self.total_calls(),
            self.failure_count,
            self.success_count,
            self.failure_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stat_is_closed_and_empty() {
        let stat = CircuitBreakerStat::default();

        assert_eq!(stat.state, CircuitState::Closed);
        assert_eq!(stat.total_calls(), 0);
        assert_eq!(stat.failure_rate(), 0.0);
        assert!(stat.is_healthy());
    }

    #[test]
    fn test_stat_health_follows_state() {
        let mut stat = CircuitBreakerStat {
            state: CircuitState::Closed,
            failure_count: 9,
            success_count: 1,
        };
        assert!(stat.is_healthy());

        // Open state is never healthy
        stat.state = CircuitState::Open;
        assert!(!stat.is_healthy());

        // Half-open is considered healthy (recovering)
        stat.state = CircuitState::HalfOpen;
        assert!(stat.is_healthy());
    }

    #[test]
    fn test_format_summary() {
        let stat = CircuitBreakerStat {
            state: CircuitState::Open,
            failure_count: 3,
            success_count: 1,
        };

        assert_eq!(
            stat.format_summary(),
            "State: Failing - Rejecting all calls | Calls: 4 | Failures: 3 | Successes: 1 | Failure rate: 75.0%"
        );
    }

    #[test]
    fn test_stat_serializes_state_in_snake_case() {
        let stat = CircuitBreakerStat {
            state: CircuitState::HalfOpen,
            failure_count: 2,
            success_count: 5,
        };

        let json = serde_json::to_value(stat).unwrap();
        assert_eq!(json["state"], "half_open");
        assert_eq!(json["failure_count"], 2);
        assert_eq!(json["success_count"], 5);
    }
}
