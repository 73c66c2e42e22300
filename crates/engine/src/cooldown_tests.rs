// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lbr_core::test_support::target;
use lbr_core::FakeClock;

#[test]
fn inactive_before_activation() {
    let clock = FakeClock::new();
    let tracker = CooldownTracker::new(clock);
    assert!(!tracker.is_active(&target("lb-1", "task-1", "1.1.1.1")));
}

#[test]
fn active_until_deadline_then_expires() {
    let clock = FakeClock::new();
    let tracker = CooldownTracker::new(clock.clone());
    let t = target("lb-1", "task-1", "1.1.1.1");

    tracker.activate(t.clone(), Duration::from_secs(30));
    assert!(tracker.is_active(&t));

    clock.advance(Duration::from_secs(29));
    assert!(tracker.is_active(&t));

    clock.advance(Duration::from_secs(2));
    assert!(!tracker.is_active(&t));
}

#[test]
fn active_count_ignores_expired() {
    let clock = FakeClock::new();
    let tracker = CooldownTracker::new(clock.clone());
    tracker.activate(target("lb-1", "task-1", "1.1.1.1"), Duration::from_secs(10));
    tracker.activate(target("lb-1", "task-2", "1.1.1.2"), Duration::from_secs(60));
    assert_eq!(tracker.active_count(), 2);

    clock.advance(Duration::from_secs(20));
    assert_eq!(tracker.active_count(), 1);
}

#[test]
fn clear_expired_prunes_the_map() {
    let clock = FakeClock::new();
    let tracker = CooldownTracker::new(clock.clone());
    tracker.activate(target("lb-1", "task-1", "1.1.1.1"), Duration::from_secs(10));
    clock.advance(Duration::from_secs(20));

    tracker.clear_expired();
    assert_eq!(tracker.deadlines.lock().len(), 0);
}
