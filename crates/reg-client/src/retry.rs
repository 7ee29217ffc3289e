//! Bounded fixed-delay retry policy.
//!
//! The delay is fixed, never exponential, and every retried failure class
//! carries its own independent attempt bound.

use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the fixed delay between retries.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Attempt counter for one failure class within one submission.
///
/// Replaces retry-by-reinvocation with an explicit loop bound: callers ask
/// [`RetryPolicy::try_again`] before looping, and the policy says no once the
/// bound is spent.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new policy allowing `max_retries` retries.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            attempt: 0,
        }
    }

    /// Number of retries consumed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a failed attempt. Returns false once the bound is exhausted.
    pub fn try_again(&mut self) -> bool {
        if self.attempt < self.max_retries {
            self.attempt += 1;
            true
        } else {
            false
        }
    }

    /// Reset the counter for a new submission.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
