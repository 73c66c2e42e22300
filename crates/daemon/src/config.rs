// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-derived configuration for the Loop Driver, read the way
//! `daemon/src/env.rs` reads the original daemon's tunables: plain
//! `std::env::var` lookups with typed fallbacks, no config-file format.

use std::time::Duration;

const DEFAULT_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_MAX_CONCURRENT_LBS: usize = 16;

/// Tunables for [`crate::Reconciler`]. Tests should construct these
/// explicitly rather than reading the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Minimum interval between tick starts.
    pub reconciliation_delay: Duration,
    /// Per-tick upper bound; associations not finished by this deadline are
    /// abandoned for the tick and retried on the next one.
    pub reconciliation_timeout: Duration,
    /// Bounded fan-out width across associations processed concurrently.
    pub max_concurrent_lbs: usize,
}

impl ReconcilerConfig {
    /// Read `RECONCILER_DELAY_MS`, `RECONCILER_TIMEOUT_MS` and
    /// `RECONCILER_MAX_CONCURRENT_LBS`, falling back to defaults for any
    /// that are unset or unparseable.
    pub fn from_env() -> Self {
        let reconciliation_delay = std::env::var("RECONCILER_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DELAY);

        let reconciliation_timeout = std::env::var("RECONCILER_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(reconciliation_delay * 10);

        let max_concurrent_lbs = std::env::var("RECONCILER_MAX_CONCURRENT_LBS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_CONCURRENT_LBS);

        Self { reconciliation_delay, reconciliation_timeout, max_concurrent_lbs }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            reconciliation_delay: DEFAULT_DELAY,
            reconciliation_timeout: DEFAULT_DELAY * 10,
            max_concurrent_lbs: DEFAULT_MAX_CONCURRENT_LBS,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
