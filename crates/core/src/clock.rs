// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so cooldown deadlines can be tested without real sleeps.
//!
//! The cooldown tracker and the loop driver both need "now" but must never
//! read wall-clock time directly, or tests would need real sleeps to cover
//! multi-tick cooldown expiry. A [`FakeClock`] lets tests advance time in a
//! single call.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A source of monotonic time.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
}

/// The real system clock, backed by [`Instant::now`].
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A controllable clock for tests. Shared clones observe the same time.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advance the clock by `duration`, simulating ticks passing.
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
    }

    /// Pin the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.current.lock() = instant;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
