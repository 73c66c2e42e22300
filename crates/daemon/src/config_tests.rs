// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_derives_timeout_from_delay() {
    let config = ReconcilerConfig::default();
    assert_eq!(config.reconciliation_delay, Duration::from_secs(30));
    assert_eq!(config.reconciliation_timeout, Duration::from_secs(300));
    assert_eq!(config.max_concurrent_lbs, 16);
}

#[test]
fn from_env_reads_overrides() {
    std::env::set_var("RECONCILER_DELAY_MS", "1000");
    std::env::set_var("RECONCILER_TIMEOUT_MS", "5000");
    std::env::set_var("RECONCILER_MAX_CONCURRENT_LBS", "4");

    let config = ReconcilerConfig::from_env();

    assert_eq!(config.reconciliation_delay, Duration::from_millis(1000));
    assert_eq!(config.reconciliation_timeout, Duration::from_millis(5000));
    assert_eq!(config.max_concurrent_lbs, 4);

    std::env::remove_var("RECONCILER_DELAY_MS");
    std::env::remove_var("RECONCILER_TIMEOUT_MS");
    std::env::remove_var("RECONCILER_MAX_CONCURRENT_LBS");
}

#[test]
fn from_env_falls_back_when_unset() {
    std::env::remove_var("RECONCILER_DELAY_MS");
    std::env::remove_var("RECONCILER_TIMEOUT_MS");
    std::env::remove_var("RECONCILER_MAX_CONCURRENT_LBS");

    let config = ReconcilerConfig::from_env();
    assert_eq!(config, ReconcilerConfig::default());
}
