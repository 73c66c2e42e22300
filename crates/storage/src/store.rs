// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `AssociationStore` contract, §3 of the reconciler's spec.

use crate::error::StoreError;
use async_trait::async_trait;
use lbr_core::{Association, AssociationState, JobId, LoadBalancerId, TargetIdentifier, TargetState};

/// Persists `(job, load balancer, association-state)` tuples and per-target
/// state for a load balancer.
///
/// Implementations must present a coherent per-call snapshot: a single
/// `get_targets` call sees a consistent view, but two writers racing across
/// separate calls (the reactive path and the reconciler) may interleave —
/// the reconciler tolerates that by design.
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// Upsert the association's state.
    async fn put_association(
        &self,
        job_id: JobId,
        load_balancer_id: LoadBalancerId,
        state: AssociationState,
    ) -> Result<(), StoreError>;

    /// All known associations, in no particular order.
    async fn get_associations(&self) -> Result<Vec<Association>, StoreError>;

    /// Load balancers the given job is (or was) associated with.
    async fn get_associated_load_balancers_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<LoadBalancerId>, StoreError>;

    /// Remove an association record outright. Callers must have already
    /// established invariant I4 (no remaining target records) before calling
    /// this for a `Dissociated` association.
    async fn remove_association(&self, job_id: &JobId, load_balancer_id: &LoadBalancerId) -> Result<(), StoreError>;

    /// Upsert target records by their `TargetIdentifier` key.
    async fn put_targets(&self, targets: Vec<(TargetIdentifier, TargetState)>) -> Result<(), StoreError>;

    /// All target records for a load balancer, ordered by `(task_id, ip)`
    /// for deterministic iteration.
    async fn get_targets(
        &self,
        load_balancer_id: &LoadBalancerId,
    ) -> Result<Vec<(TargetIdentifier, TargetState)>, StoreError>;

    /// Remove target records outright.
    async fn remove_targets(&self, targets: Vec<TargetIdentifier>) -> Result<(), StoreError>;
}
