//! Retry state machine.
//!
//! One call walks a grid of `(backend_index, attempt_index)`:
//! - success is terminal;
//! - a failure with attempts left stays on the backend after a backoff delay;
//! - a failure on the last attempt moves to the next backend immediately;
//! - a failure on the last attempt of the last backend is terminal.

use std::time::Duration;

/// Backoff between attempts on the same backend: `base_delay × attempt_number`,
/// where the first retry follows attempt number 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn linear(base_delay: Duration) -> Self {
        Self { base_delay }
    }

    /// No waiting between attempts.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after the failed attempt `attempt_number` (1-based).
    pub fn delay_after(&self, attempt_number: u32) -> Duration {
        self.base_delay.saturating_mul(attempt_number)
    }
}

/// Current position of one orchestrated call. `attempt_index` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    pub backend_index: usize,
    pub attempt_index: u32,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same backend, next attempt, after `delay`.
    Retry { next: AttemptState, delay: Duration },
    /// Next backend, first attempt, no delay.
    Fallback { next: AttemptState },
    /// Every backend has used all its attempts.
    Exhausted,
}

impl AttemptState {
    pub fn start() -> Self {
        Self {
            backend_index: 0,
            attempt_index: 0,
        }
    }

    /// Attempt number as shown to humans (1-based).
    pub fn attempt_number(&self) -> u32 {
        self.attempt_index + 1
    }

    pub fn on_failure(self, retries: u32, backend_count: usize, policy: &RetryPolicy) -> Transition {
        if self.attempt_index < retries {
            return Transition::Retry {
                next: AttemptState {
                    backend_index: self.backend_index,
                    attempt_index: self.attempt_index + 1,
                },
                delay: policy.delay_after(self.attempt_number()),
            };
        }
        if self.backend_index + 1 < backend_count {
            return Transition::Fallback {
                next: AttemptState {
                    backend_index: self.backend_index + 1,
                    attempt_index: 0,
                },
            };
        }
        Transition::Exhausted
    }
}
