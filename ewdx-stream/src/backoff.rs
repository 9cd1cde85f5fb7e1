//! Reconnect backoff
//!
//! Delay for attempt `n` (1-based) is `base * 2^(n-1)`, capped. Attempts past
//! the budget get no delay at all: the caller treats that as terminal.

use std::time::Duration;

use crate::config::StreamTiming;

/// Exponential backoff with a cap and an attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base: Duration,
    cap: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            cap,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before reconnect attempt `attempt`, or `None` once the budget is spent
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let multiplier = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.base.saturating_mul(multiplier).min(self.cap))
    }
}

impl From<&StreamTiming> for ReconnectPolicy {
    fn from(timing: &StreamTiming) -> Self {
        Self::new(
            timing.reconnect_base,
            timing.reconnect_cap,
            timing.max_reconnect_attempts,
        )
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&StreamTiming::default())
    }
}
