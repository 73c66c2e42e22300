// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::snapshot::RunningTaskIp;
use lbr_adapters::CloudLoadBalancerView;
use lbr_core::test_support::{job, load_balancer, target};
use lbr_core::FakeClock;

fn no_cooldown() -> CooldownTracker<FakeClock> {
    CooldownTracker::new(FakeClock::new())
}

fn view(state: CloudState, ips: &[&str]) -> CloudQuery {
    CloudQuery::View {
        cloud_state: state,
        registered_ips: ips.iter().map(|ip| IpAddress::parse(ip).unwrap()).collect(),
    }
}

fn running(pairs: &[(&str, &str)]) -> TaskQuery {
    TaskQuery::Running(
        pairs
            .iter()
            .map(|(task, ip)| RunningTaskIp::new(lbr_core::TaskId::new(*task), IpAddress::parse(ip).unwrap()))
            .collect(),
    )
}

// Scenario 1: five running tasks, empty cloud, empty store. Every task's IP
// gets registered.
#[test]
fn rule1_registers_every_missing_running_task() {
    let tasks: Vec<RunningTaskIp> = (1..=5)
        .map(|n| RunningTaskIp::new(lbr_core::TaskId::new(format!("task-{n}")), IpAddress::parse(&format!("{n}.{n}.{n}.{n}")).unwrap()))
        .collect();
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        TaskQuery::Running(tasks),
        view(CloudState::Active, &[]),
        vec![],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert_eq!(outcome.transitions.len(), 5);
    assert!(outcome.transitions.iter().all(|t| t.desired_state == TargetState::Registered && t.reason == Reason::MissingInLb));
    assert_eq!(outcome.mutations.len(), 5);
}

// Scenario 2: three live tasks already registered, two dead tasks still in
// the cloud (one Registered in store, one already Deregistered), and one
// cloud IP with no store record at all.
#[test]
fn dead_tasks_get_deregistered_untracked_cloud_ip_untouched() {
    let lb = load_balancer("lb-1");
    let stored = vec![
        (target("lb-1", "task-1", "1.1.1.1"), TargetState::Registered),
        (target("lb-1", "task-2", "2.2.2.2"), TargetState::Registered),
        (target("lb-1", "task-3", "3.3.3.3"), TargetState::Registered),
        (target("lb-1", "some-dead-task", "4.4.4.4"), TargetState::Registered),
        (target("lb-1", "another-dead-task", "5.5.5.5"), TargetState::Deregistered),
    ];
    let snapshot = Snapshot::new(
        job("job-1"),
        lb,
        AssociationState::Associated,
        running(&[("task-1", "1.1.1.1"), ("task-2", "2.2.2.2"), ("task-3", "3.3.3.3")]),
        view(CloudState::Active, &["1.1.1.1", "2.2.2.2", "3.3.3.3", "4.4.4.4", "5.5.5.5", "6.6.6.6"]),
        stored,
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert_eq!(outcome.transitions.len(), 2);
    assert!(outcome.transitions.iter().all(|t| t.desired_state == TargetState::Deregistered && t.reason == Reason::ExtraInLb));
    let ids: Vec<_> = outcome.transitions.iter().map(|t| t.identifier.ip.to_string()).collect();
    assert!(ids.contains(&"4.4.4.4".to_string()));
    assert!(ids.contains(&"5.5.5.5".to_string()));
    // Only the Registered-row (rule 2) produces a store mutation; the
    // already-Deregistered row (rule 3) repeats the emission without one.
    assert_eq!(outcome.mutations.len(), 1);
}

#[test]
fn cooldown_suppresses_register() {
    let target_id = target("lb-1", "task-1", "1.1.1.1");
    let cooldown = no_cooldown();
    cooldown.activate(target_id, std::time::Duration::from_secs(30));

    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        running(&[("task-1", "1.1.1.1")]),
        view(CloudState::Active, &[]),
        vec![],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &cooldown);
    assert!(outcome.transitions.is_empty());
    assert!(outcome.mutations.is_empty());
}

#[test]
fn orphan_by_job_not_found_only_marks_dissociated() {
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        TaskQuery::JobNotFound,
        view(CloudState::Active, &[]),
        vec![(target("lb-1", "task-1", "1.1.1.1"), TargetState::Registered)],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert_eq!(outcome.mutations, vec![StoreMutation::SetAssociationState(AssociationState::Dissociated)]);
    assert!(outcome.transitions.is_empty());
}

// Orphan-by-cloud-removal marks Dissociated AND runs the Dissociated rules
// in the same tick, per spec.md §7's "treat as orphan; proceed with
// Dissociated phases" (spec.md §8, scenario 7).
#[test]
fn orphan_by_cloud_removal_marks_and_cascades_to_dissociated_rules() {
    let stored: Vec<_> =
        (1..=5).map(|n| (target("lb-1", &format!("task-{n}"), &format!("{n}.{n}.{n}.{n}")), TargetState::Registered)).collect();
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        running(&[("task-1", "1.1.1.1")]),
        view(CloudState::Removed, &[]),
        stored,
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert!(outcome.mutations.contains(&StoreMutation::SetAssociationState(AssociationState::Dissociated)));
    assert_eq!(outcome.transitions.len(), 5);
    assert!(outcome.transitions.iter().all(|t| t.desired_state == TargetState::Deregistered && t.reason == Reason::OrphanCleanup));
    // None of the five are swept yet — they were Registered in this
    // snapshot, not Deregistered, so step 2 doesn't see them.
    assert!(!outcome.mutations.contains(&StoreMutation::RemoveAssociation));
}

#[test]
fn dissociated_sweeps_and_removes_association_once_nothing_remains() {
    let stored = vec![(target("lb-1", "task-1", "1.1.1.1"), TargetState::Deregistered)];
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Dissociated,
        TaskQuery::JobNotFound,
        view(CloudState::Removed, &[]),
        stored,
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert!(outcome.mutations.contains(&StoreMutation::RemoveTargets(vec![target("lb-1", "task-1", "1.1.1.1")])));
    assert!(outcome.mutations.contains(&StoreMutation::RemoveAssociation));
    assert!(outcome.transitions.is_empty());
}

#[test]
fn dissociated_with_no_stored_targets_removes_association_immediately() {
    let snapshot =
        Snapshot::new(job("job-1"), load_balancer("lb-1"), AssociationState::Dissociated, TaskQuery::JobNotFound, view(CloudState::Removed, &[]), vec![]);

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert_eq!(outcome.mutations, vec![StoreMutation::RemoveAssociation]);
}

#[test]
fn dissociated_skips_sweep_when_connector_unavailable() {
    let stored = vec![(target("lb-1", "task-1", "1.1.1.1"), TargetState::Deregistered)];
    let snapshot =
        Snapshot::new(job("job-1"), load_balancer("lb-1"), AssociationState::Dissociated, TaskQuery::JobNotFound, CloudQuery::Unavailable, stored);

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert!(outcome.mutations.is_empty());
    assert!(outcome.transitions.is_empty());
}

// Scenario 8, tick 1: one live task already in the cloud, a Registered row
// whose IP the cloud never actually had (inconsistent store), and a
// Deregistered row the cloud has already dropped (ready to sweep).
#[test]
fn inconsistent_store_is_repaired_and_stale_deregistered_row_swept() {
    let stored = vec![
        (target("lb-1", "target-inconsistent", "2.2.2.2"), TargetState::Registered),
        (target("lb-1", "target-not-in-lb", "3.3.3.3"), TargetState::Deregistered),
    ];
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        running(&[("task-1", "1.1.1.1")]),
        view(CloudState::Active, &["1.1.1.1", "10.10.10.10"]),
        stored,
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert_eq!(outcome.transitions.len(), 1);
    assert_eq!(outcome.transitions[0].identifier.ip.to_string(), "2.2.2.2");
    assert_eq!(outcome.transitions[0].reason, Reason::InconsistentStore);
    assert!(outcome.mutations.contains(&StoreMutation::RemoveTargets(vec![target("lb-1", "target-not-in-lb", "3.3.3.3")])));
}

#[test]
fn transient_job_ops_error_skips_rules() {
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        TaskQuery::Transient,
        view(CloudState::Active, &[]),
        vec![(target("lb-1", "task-1", "1.1.1.1"), TargetState::Registered)],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());
    assert!(outcome.mutations.is_empty());
    assert!(outcome.transitions.is_empty());
}

#[test]
fn connector_unavailable_skips_rules() {
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        running(&[("task-1", "1.1.1.1")]),
        CloudQuery::Unavailable,
        vec![],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());
    assert!(outcome.mutations.is_empty());
    assert!(outcome.transitions.is_empty());
}

#[yare::parameterized(
    registered_and_still_live = { TargetState::Registered, true, true, None },
    registered_task_died_cloud_has_it = { TargetState::Registered, true, false, Some(Reason::ExtraInLb) },
    registered_neither_agrees = { TargetState::Registered, false, false, Some(Reason::InconsistentStore) },
    deregistered_cloud_still_has_it = { TargetState::Deregistered, true, false, Some(Reason::ExtraInLb) },
)]
fn associated_rule_partition(stored_state: TargetState, ip_registered: bool, task_running: bool, expected_reason: Option<Reason>) {
    let cloud_ips: &[&str] = if ip_registered { &["9.9.9.9"] } else { &[] };
    let tasks: &[(&str, &str)] = if task_running { &[("task-1", "9.9.9.9")] } else { &[] };
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        running(tasks),
        view(CloudState::Active, cloud_ips),
        vec![(target("lb-1", "task-1", "9.9.9.9"), stored_state)],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    match expected_reason {
        Some(reason) => {
            assert_eq!(outcome.transitions.len(), 1);
            assert_eq!(outcome.transitions[0].reason, reason);
        }
        None => assert!(outcome.transitions.is_empty()),
    }
}

#[test]
fn deregistered_and_not_in_cloud_sweeps_without_emitting() {
    let snapshot = Snapshot::new(
        job("job-1"),
        load_balancer("lb-1"),
        AssociationState::Associated,
        running(&[]),
        view(CloudState::Active, &[]),
        vec![(target("lb-1", "task-1", "9.9.9.9"), TargetState::Deregistered)],
    );

    let outcome = PhaseEngine::evaluate(&snapshot, &no_cooldown());

    assert!(outcome.transitions.is_empty());
    assert_eq!(outcome.mutations, vec![StoreMutation::RemoveTargets(vec![target("lb-1", "task-1", "9.9.9.9")])]);
}
