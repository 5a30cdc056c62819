//! Bounded retry policy.
//!
//! The addon offers no acknowledgement for anything we do, so most
//! interactions are "try, look, try again". Each call site owns a policy
//! instead of hard-coding its attempt count.

use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// A policy of `attempts` tries, pausing `delay` between them.
    /// At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts.max(1),
            delay,
        }
    }

    /// Attempt numbers, starting at 1.
    pub fn attempts(&self) -> RangeInclusive<u32> {
        1..=self.max_attempts
    }

    /// Sleep for the configured delay, if any.
    pub fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}
