//! Where a point in time falls inside an open period.
//!
//! Both backends reduce "time left until the open period ends" to one of
//! three positions. The memory store computes the remaining time from the
//! last failure timestamp; the distributed store reads it from the key TTL.

use std::time::Duration;

/// Position within the open period measured from the last failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenWindowPosition {
    /// The open period has fully elapsed
    Expired,
    /// Inside the final `half_open_window` of the open period
    HalfOpen,
    /// Earlier in the open period
    Open,
}

impl OpenWindowPosition {
    /// Classify the remaining open time in milliseconds (may be negative)
    pub(crate) fn from_remaining_millis(remaining_ms: i64, half_open_window: Duration) -> Self {
        if remaining_ms <= 0 {
            return OpenWindowPosition::Expired;
        }
        if remaining_ms <= duration_millis(half_open_window) {
            return OpenWindowPosition::HalfOpen;
        }
        OpenWindowPosition::Open
    }

    /// Classify from the last failure timestamp (Unix ms) and the current time
    pub(crate) fn at(
        last_failure_ms: i64,
        now_ms: i64,
        open_window: Duration,
        half_open_window: Duration,
    ) -> Self {
        let expires_at = last_failure_ms.saturating_add(duration_millis(open_window));
        Self::from_remaining_millis(expires_at.saturating_sub(now_ms), half_open_window)
    }
}

pub(crate) fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: Duration = Duration::from_secs(60);
    const HALF: Duration = Duration::from_secs(30);

    #[test]
    fn test_positions_across_the_open_period() {
        let t0 = 1_700_000_000_000;

        assert_eq!(OpenWindowPosition::at(t0, t0, OPEN, HALF), OpenWindowPosition::Open);
        assert_eq!(
            OpenWindowPosition::at(t0, t0 + 29_999, OPEN, HALF),
            OpenWindowPosition::Open
        );
        // Boundary is inclusive: exactly half_open_window left reads HalfOpen
        assert_eq!(
            OpenWindowPosition::at(t0, t0 + 30_000, OPEN, HALF),
            OpenWindowPosition::HalfOpen
        );
        assert_eq!(
            OpenWindowPosition::at(t0, t0 + 59_999, OPEN, HALF),
            OpenWindowPosition::HalfOpen
        );
        assert_eq!(
            OpenWindowPosition::at(t0, t0 + 60_000, OPEN, HALF),
            OpenWindowPosition::Expired
        );
    }

    #[test]
    fn test_zero_half_open_window_never_reads_half_open() {
        assert_eq!(
            OpenWindowPosition::from_remaining_millis(1, Duration::ZERO),
            OpenWindowPosition::Open
        );
        assert_eq!(
            OpenWindowPosition::from_remaining_millis(0, Duration::ZERO),
            OpenWindowPosition::Expired
        );
    }
}
