//! Linear retry backoff.
//!
//! Attempt `i` (0-based) that fails with a retryable error is followed by a
//! pause of `(i + 1) * backoff_step`; the last attempt is never followed by
//! a pause.

use backon::BackoffBuilder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Base pause, multiplied by the attempt number
    #[serde(with = "crate::config::duration_human")]
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a policy; fewer than one attempt is raised to one.
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    /// A policy that makes a single attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Effective attempt count; a deserialized zero still means one attempt.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pause after the failed attempt with 0-based index `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt.saturating_add(1))
    }
}

impl BackoffBuilder for RetryPolicy {
    type Backoff = LinearBackoff;

    fn build(self) -> Self::Backoff {
        LinearBackoff {
            policy: self,
            next_attempt: 0,
        }
    }
}

/// Iterator of pauses between attempts, `max_attempts - 1` items long.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    policy: RetryPolicy,
    next_attempt: u32,
}

impl Iterator for LinearBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.next_attempt + 1 >= self.policy.attempts() {
            return None;
        }
        let delay = self.policy.delay_after(self.next_attempt);
        self.next_attempt += 1;
        Some(delay)
    }
}
