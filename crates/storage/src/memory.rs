// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `AssociationStore`, the reference implementation used by
//! tests and by any caller that doesn't need real persistence.

use crate::error::StoreError;
use crate::store::AssociationStore;
use async_trait::async_trait;
use lbr_core::{Association, AssociationState, JobId, LoadBalancerId, TargetIdentifier, TargetState};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct State {
    associations: HashMap<(JobId, LoadBalancerId), AssociationState>,
    targets: HashMap<LoadBalancerId, BTreeMap<TargetIdentifier, TargetState>>,
}

/// An in-memory, process-local `AssociationStore`.
///
/// Guarded by a single `RwLock`, which is enough to give every call a
/// coherent snapshot of the data it reads — the stronger guarantee callers
/// must not assume is cross-call atomicity.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssociationStore for InMemoryStore {
    async fn put_association(
        &self,
        job_id: JobId,
        load_balancer_id: LoadBalancerId,
        state: AssociationState,
    ) -> Result<(), StoreError> {
        self.state.write().associations.insert((job_id, load_balancer_id), state);
        Ok(())
    }

    async fn get_associations(&self) -> Result<Vec<Association>, StoreError> {
        Ok(self
            .state
            .read()
            .associations
            .iter()
            .map(|((job_id, lb_id), state)| Association::new(job_id.clone(), lb_id.clone(), *state))
            .collect())
    }

    async fn get_associated_load_balancers_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<LoadBalancerId>, StoreError> {
        Ok(self
            .state
            .read()
            .associations
            .keys()
            .filter(|(j, _)| j == job_id)
            .map(|(_, lb_id)| lb_id.clone())
            .collect())
    }

    async fn remove_association(&self, job_id: &JobId, load_balancer_id: &LoadBalancerId) -> Result<(), StoreError> {
        self.state.write().associations.remove(&(job_id.clone(), load_balancer_id.clone()));
        Ok(())
    }

    async fn put_targets(&self, targets: Vec<(TargetIdentifier, TargetState)>) -> Result<(), StoreError> {
        let mut guard = self.state.write();
        for (identifier, target_state) in targets {
            guard
                .targets
                .entry(identifier.load_balancer_id.clone())
                .or_default()
                .insert(identifier, target_state);
        }
        Ok(())
    }

    async fn get_targets(
        &self,
        load_balancer_id: &LoadBalancerId,
    ) -> Result<Vec<(TargetIdentifier, TargetState)>, StoreError> {
        Ok(self
            .state
            .read()
            .targets
            .get(load_balancer_id)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default())
    }

    async fn remove_targets(&self, targets: Vec<TargetIdentifier>) -> Result<(), StoreError> {
        let mut guard = self.state.write();
        for identifier in targets {
            if let Some(by_lb) = guard.targets.get_mut(&identifier.load_balancer_id) {
                by_lb.remove(&identifier);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
