//! # Circuit State
//!
//! The three states every backend resolves to. Stored as a `u8` inside the
//! in-memory backend's atomic state field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CircuitState {
    /// Requests pass, failures accumulate
    #[default]
    Closed = 0,
    /// Requests are denied
    Open = 1,
    /// Requests pass on a trial basis during the final stretch of the open period
    HalfOpen = 2,
}

impl CircuitState {
    /// Human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }

    /// Whether this state lets calls through
    pub fn allows_requests(&self) -> bool {
        !matches!(self, CircuitState::Open)
    }
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            2 => CircuitState::HalfOpen,
            // Unknown values read as Open (safest)
            _ => CircuitState::Open,
        }
    }
}

impl From<CircuitState> for u8 {
    fn from(state: CircuitState) -> Self {
        state as u8
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
