// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks which targets the reactive path recently settled, so the phase
//! engine doesn't second-guess a change that hasn't propagated to the cloud
//! yet. See `spec.md` §4.1.

use lbr_core::{Clock, TargetIdentifier};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-target expiration deadlines. Activated externally (by the reactive
/// path, never by the phase engine itself); queried by the phase engine on
/// every tick.
pub struct CooldownTracker<C: Clock> {
    clock: C,
    deadlines: Mutex<HashMap<TargetIdentifier, Instant>>,
}

impl<C: Clock> CooldownTracker<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, deadlines: Mutex::new(HashMap::new()) }
    }

    /// `target` is under cooldown until `duration` from now.
    pub fn activate(&self, target: TargetIdentifier, duration: Duration) {
        let deadline = self.clock.now() + duration;
        self.deadlines.lock().insert(target, deadline);
    }

    /// Whether `target` is still under cooldown. Prunes the entry
    /// opportunistically if it has expired.
    pub fn is_active(&self, target: &TargetIdentifier) -> bool {
        let now = self.clock.now();
        let mut deadlines = self.deadlines.lock();
        match deadlines.get(target) {
            Some(deadline) if *deadline > now => true,
            Some(_) => {
                deadlines.remove(target);
                false
            }
            None => false,
        }
    }

    /// How many targets currently hold an unexpired cooldown deadline.
    /// Does not prune; see [`CooldownTracker::clear_expired`].
    pub fn active_count(&self) -> usize {
        let now = self.clock.now();
        self.deadlines.lock().values().filter(|deadline| **deadline > now).count()
    }

    /// Drop every deadline that has already passed. The loop driver calls
    /// this once per tick so the map doesn't grow unbounded across the
    /// lifetime of a long-running reconciler.
    pub fn clear_expired(&self) {
        let now = self.clock.now();
        self.deadlines.lock().retain(|_, deadline| *deadline > now);
    }
}

#[cfg(test)]
#[path = "cooldown_tests.rs"]
mod tests;
