// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The phase engine: a pure function from a [`Snapshot`] to the mutations
//! and transitions that tick requires. See `spec.md` §4.2 for the decision
//! table this implements rule-by-rule.
//!
//! Deliberately does no I/O — the loop driver gathers the snapshot, calls
//! [`PhaseEngine::evaluate`], then applies the outcome. That split is what
//! makes the rule table testable with plain fixtures instead of fakes.

use crate::cooldown::CooldownTracker;
use crate::snapshot::{CloudQuery, Snapshot, TaskQuery};
use lbr_adapters::CloudState;
use lbr_core::{AssociationState, Clock, IpAddress, LoadBalancerId, Reason, TargetIdentifier, TargetState, TargetTransition, TaskId};
use crate::snapshot::RunningTaskIp;
use std::collections::HashSet;

/// A single change the loop driver must apply to the `AssociationStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMutation {
    SetAssociationState(AssociationState),
    RemoveAssociation,
    PutTargets(Vec<(TargetIdentifier, TargetState)>),
    RemoveTargets(Vec<TargetIdentifier>),
}

/// What one [`PhaseEngine::evaluate`] call for one association produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub mutations: Vec<StoreMutation>,
    pub transitions: Vec<TargetTransition>,
}

impl PhaseOutcome {
    fn put_target(&mut self, id: TargetIdentifier, state: TargetState) {
        self.mutations.push(StoreMutation::PutTargets(vec![(id, state)]));
    }
}

/// The stateless decision function. Holds no data of its own — every call
/// takes the snapshot, the cooldown tracker and the current time explicitly.
pub struct PhaseEngine;

impl PhaseEngine {
    /// Evaluate one association's snapshot and return the mutations and
    /// transitions this tick requires.
    ///
    /// The two orphan triggers are handled differently per `spec.md` §7:
    /// a removed load balancer marks the association AND proceeds with the
    /// `Dissociated` phases in the same tick ("Cloud-removed: treat as
    /// orphan; proceed with Dissociated phases"); a missing job only marks
    /// it, leaving the `Dissociated` rules for the following tick once the
    /// mutation has been applied and re-read.
    pub fn evaluate<C: Clock>(snapshot: &Snapshot, cooldown: &CooldownTracker<C>) -> PhaseOutcome {
        let mut outcome = PhaseOutcome::default();

        match snapshot.association_state {
            AssociationState::Associated if snapshot.is_cloud_orphan() => {
                outcome.mutations.push(StoreMutation::SetAssociationState(AssociationState::Dissociated));
                dissociated_rules(&snapshot.cloud, &snapshot.stored, cooldown, &mut outcome);
            }
            AssociationState::Associated if snapshot.is_job_orphan() => {
                outcome.mutations.push(StoreMutation::SetAssociationState(AssociationState::Dissociated));
            }
            AssociationState::Associated => {
                if let (TaskQuery::Running(tasks), CloudQuery::View { cloud_state: CloudState::Active, registered_ips }) =
                    (&snapshot.tasks, &snapshot.cloud)
                {
                    associated_rules(&snapshot.load_balancer_id, tasks, registered_ips, &snapshot.stored, cooldown, &mut outcome);
                }
                // JobOps-transient or Connector-transient: skip, retry
                // next tick.
            }
            AssociationState::Dissociated => {
                dissociated_rules(&snapshot.cloud, &snapshot.stored, cooldown, &mut outcome);
            }
        }

        outcome
    }
}

fn associated_rules<C: Clock>(
    load_balancer_id: &LoadBalancerId,
    tasks: &[RunningTaskIp],
    registered_ips: &HashSet<IpAddress>,
    stored: &[(TargetIdentifier, TargetState)],
    cooldown: &CooldownTracker<C>,
    outcome: &mut PhaseOutcome,
) {
    let running_task_ids: HashSet<&TaskId> = tasks.iter().map(|t| &t.task_id).collect();

    // Rule 1: register every running task's IP missing from the cloud.
    for task in tasks {
        let target = TargetIdentifier::new(load_balancer_id.clone(), task.task_id.clone(), task.ip.clone());
        if !registered_ips.contains(&task.ip) && !cooldown.is_active(&target) {
            outcome.put_target(target.clone(), TargetState::Registered);
            outcome.transitions.push(TargetTransition::new(target, TargetState::Registered, Reason::MissingInLb));
        }
    }

    // Rules 2-5 partition the stored records by (state, cloud membership,
    // whether the owning task is still running). The partition is
    // exhaustive and disjoint: at most one rule fires per stored target.
    for (id, state) in stored {
        let ip_registered = registered_ips.contains(&id.ip);
        let task_running = running_task_ids.contains(&id.task_id);

        match (state, ip_registered, task_running) {
            // Rule 2: we registered it, the task died, the cloud hasn't
            // caught up yet. First transition to Deregistered.
            (TargetState::Registered, true, false) => {
                if !cooldown.is_active(id) {
                    outcome.put_target(id.clone(), TargetState::Deregistered);
                    outcome.transitions.push(TargetTransition::new(id.clone(), TargetState::Deregistered, Reason::ExtraInLb));
                }
            }
            // Rule 3: already marked deregistered, but the cloud still has
            // it. Repeat the request; no store change needed.
            (TargetState::Deregistered, true, _) => {
                if !cooldown.is_active(id) {
                    outcome.transitions.push(TargetTransition::new(id.clone(), TargetState::Deregistered, Reason::ExtraInLb));
                }
            }
            // Rule 4: the store says Registered, but neither the cloud nor
            // the running-task set agrees. Repair the store and emit.
            (TargetState::Registered, false, false) => {
                if !cooldown.is_active(id) {
                    outcome.put_target(id.clone(), TargetState::Deregistered);
                    outcome.transitions.push(TargetTransition::new(id.clone(), TargetState::Deregistered, Reason::InconsistentStore));
                }
            }
            // Rule 5: sweep — deregistered and gone from the cloud, the
            // record has served its purpose.
            (TargetState::Deregistered, false, _) => {
                outcome.mutations.push(StoreMutation::RemoveTargets(vec![id.clone()]));
            }
            // Registered, cloud has it, task still running: steady state.
            (TargetState::Registered, true, true) => {}
        }
    }
}

fn dissociated_rules<C: Clock>(
    cloud: &CloudQuery,
    stored: &[(TargetIdentifier, TargetState)],
    cooldown: &CooldownTracker<C>,
    outcome: &mut PhaseOutcome,
) {
    let (registered_ips, lb_removed) = match cloud {
        CloudQuery::View { cloud_state, registered_ips } => (registered_ips, *cloud_state == CloudState::Removed),
        // Unknown cloud state this tick: skip entirely rather than sweep
        // on a guess. Next tick retries.
        CloudQuery::Unavailable => return,
    };

    let mut removed = HashSet::new();

    // Step 1: deregister everything we still believe is registered.
    for (id, state) in stored {
        if *state == TargetState::Registered && !cooldown.is_active(id) {
            outcome.put_target(id.clone(), TargetState::Deregistered);
            outcome.transitions.push(TargetTransition::new(id.clone(), TargetState::Deregistered, Reason::OrphanCleanup));
        }
    }

    // Step 2: sweep already-deregistered records the cloud no longer
    // shows (or that have nothing left to show, since the load balancer
    // itself was removed). Evaluated against the snapshot's original
    // state, not step 1's output — one pure pass, no interleaving.
    for (id, state) in stored {
        if *state == TargetState::Deregistered && (lb_removed || !registered_ips.contains(&id.ip)) {
            outcome.mutations.push(StoreMutation::RemoveTargets(vec![id.clone()]));
            removed.insert(id.clone());
        }
    }

    // Step 3: once nothing is left to track for this load balancer, drop
    // the association record itself.
    let remaining = stored.len() - removed.len();
    if remaining == 0 {
        outcome.mutations.push(StoreMutation::RemoveAssociation);
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
