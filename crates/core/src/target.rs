// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The target-level data model: what a target is, what it may become, and
//! the wire shape emitted for the downstream batching engine.

use crate::ids::{IpAddress, JobId, LoadBalancerId, TaskId};
use serde::{Deserialize, Serialize};

/// A specific (load balancer, task, ip) triple that may be registered or
/// deregistered in the cloud.
///
/// All three parts are significant: the same IP may be reused by a later
/// task (a restart), and the same task can in principle map to different
/// IPs across restarts. Collapsing this to a two-part key would conflate
/// those cases; see the Open Question on task/IP reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetIdentifier {
    pub load_balancer_id: LoadBalancerId,
    pub task_id: TaskId,
    pub ip: IpAddress,
}

impl TargetIdentifier {
    pub fn new(load_balancer_id: LoadBalancerId, task_id: TaskId, ip: IpAddress) -> Self {
        Self { load_balancer_id, task_id, ip }
    }
}

/// What the reconciler believes it has most recently requested for a
/// target — not necessarily what the cloud has applied yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Registered,
    Deregistered,
}

/// `Associated` or `Dissociated`, the state of a (job, load balancer) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationState {
    Associated,
    Dissociated,
}

/// The relationship between a job and a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub job_id: JobId,
    pub load_balancer_id: LoadBalancerId,
    pub state: AssociationState,
}

impl Association {
    pub fn new(job_id: JobId, load_balancer_id: LoadBalancerId, state: AssociationState) -> Self {
        Self { job_id, load_balancer_id, state }
    }
}

/// Relative urgency of a transition. The reconciler only ever emits `Low`;
/// the (external) reactive path emits higher priorities. Downstream merges
/// by priority, with `Low` losing to anything higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
}

/// Why a transition was emitted, carried through to the batcher for
/// observability — it never changes how the batcher applies the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    /// A running task's IP is missing from the cloud's registered set.
    MissingInLb,
    /// A target we previously registered is no longer a running task, or
    /// is already marked deregistered, but the cloud still has it.
    ExtraInLb,
    /// The store disagrees with both the cloud view and the running-task
    /// set; the engine repairs the stored state before re-emitting.
    InconsistentStore,
    /// The association has no running-task signal to reconcile against
    /// (orphaned job, or a removed load balancer); everything registered
    /// gets torn down.
    OrphanCleanup,
}

/// The record emitted on the event stream for the downstream batcher to
/// debounce and apply against the cloud API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTransition {
    pub identifier: TargetIdentifier,
    pub desired_state: TargetState,
    pub priority: Priority,
    pub reason: Reason,
}

impl TargetTransition {
    pub fn new(identifier: TargetIdentifier, desired_state: TargetState, reason: Reason) -> Self {
        Self { identifier, desired_state, priority: Priority::Low, reason }
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
