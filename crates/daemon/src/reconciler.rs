// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The loop driver: ticks on a fixed interval, fans out across associations
//! with bounded concurrency, and applies each association's [`PhaseOutcome`]
//! to the store and the event stream.

use crate::config::ReconcilerConfig;
use crate::events::EventStream;
use lbr_adapters::{Connector, ConnectorError, JobOps, JobOpsError};
use lbr_core::{Association, Clock, LoadBalancerId, SystemClock};
use lbr_engine::{CloudQuery, CooldownTracker, PhaseEngine, RunningTaskIp, Snapshot, StoreMutation, TaskQuery};
use lbr_storage::AssociationStore;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// The reconciler: owns the tick loop and the store/connector/job-ops
/// handles it reconciles against. Construct with [`Reconciler::spawn`].
pub struct Reconciler<C: Clock = SystemClock> {
    store: Arc<dyn AssociationStore>,
    connector: Arc<dyn Connector>,
    job_ops: Arc<dyn JobOps>,
    cooldown: CooldownTracker<C>,
    clock: C,
    events: EventStream,
    config: ReconcilerConfig,
    ticks: AtomicU64,
    cancel: CancellationToken,
}

impl<C: Clock + 'static> Reconciler<C> {
    /// Build the reconciler and spawn its tick loop on the current runtime,
    /// returning a handle shared with the caller.
    pub fn spawn(
        store: Arc<dyn AssociationStore>,
        connector: Arc<dyn Connector>,
        job_ops: Arc<dyn JobOps>,
        clock: C,
        config: ReconcilerConfig,
    ) -> Arc<Self> {
        let reconciler = Arc::new(Self {
            store,
            connector,
            job_ops,
            cooldown: CooldownTracker::new(clock.clone()),
            clock,
            events: EventStream::new(),
            config,
            ticks: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        });

        let handle = Arc::clone(&reconciler);
        tokio::spawn(async move { handle.run().await });

        reconciler
    }

    /// Subscribe to emitted transitions. Subscribers joining after a
    /// transition was published never see it; this is `broadcast`'s native
    /// semantics and matches the Event Stream's contract.
    pub fn events(&self) -> broadcast::Receiver<lbr_core::TargetTransition> {
        self.events.subscribe()
    }

    /// Place a target under cooldown, suppressing the phase engine's
    /// opinion of it until `duration` has elapsed. Called by the reactive
    /// path after it applies a change, not by the tick loop itself.
    pub fn activate_cooldown_for(&self, target: lbr_core::TargetIdentifier, duration: Duration) {
        self.cooldown.activate(target, duration);
    }

    /// Number of ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// The clock backing this reconciler's cooldown tracker.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Request shutdown. Idempotent; the tick loop exits after finishing (or
    /// aborting) whatever tick is in flight.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.reconciliation_delay);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("reconciler shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.run_tick().await;
                }
            }
        }
    }

    async fn run_tick(self: &Arc<Self>) {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        let associations = match self.store.get_associations().await {
            Ok(associations) => associations,
            Err(error) => {
                tracing::warn!(tick, %error, "failed to load associations, skipping tick");
                return;
            }
        };

        // Group by lbId so that every load balancer gets exactly one
        // connector call this tick, no matter how many associations share
        // it.
        let mut by_load_balancer: HashMap<LoadBalancerId, Vec<Association>> = HashMap::new();
        for association in associations {
            by_load_balancer.entry(association.load_balancer_id.clone()).or_default().push(association);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_lbs.max(1)));
        let mut set = JoinSet::new();
        for (load_balancer_id, associations) in by_load_balancer {
            let reconciler = Arc::clone(self);
            let permit = Arc::clone(&semaphore);
            set.spawn(async move {
                let Ok(_permit) = permit.acquire_owned().await else {
                    // The semaphore is never closed; this only fires if the
                    // reconciler itself has been dropped mid-tick.
                    return;
                };
                reconciler.process_load_balancer(load_balancer_id, associations).await;
            });
        }

        let drain = async {
            while let Some(result) = set.join_next().await {
                if let Err(error) = result {
                    if error.is_panic() {
                        tracing::error!(tick, %error, "load balancer task panicked");
                    }
                }
            }
        };
        if tokio::time::timeout(self.config.reconciliation_timeout, drain).await.is_err() {
            tracing::warn!(tick, "tick exceeded its timeout, abandoning unfinished load balancers");
            set.abort_all();
            // Drain the aborted tasks' cancellation errors so the JoinSet
            // doesn't leak; already-finished work before the deadline keeps
            // whatever it applied and emitted.
            while set.join_next().await.is_some() {}
        }

        self.cooldown.clear_expired();
        tracing::info!(tick, "reconciliation tick complete");
    }

    /// One connector call for `load_balancer_id`, its result shared across
    /// every association that load balancer currently has.
    async fn process_load_balancer(&self, load_balancer_id: LoadBalancerId, associations: Vec<Association>) {
        let cloud = match self.connector.get_load_balancer(&load_balancer_id).await {
            Ok(view) => CloudQuery::View { cloud_state: view.cloud_state, registered_ips: view.registered_ips },
            Err(ConnectorError::NotFound(_)) => {
                CloudQuery::View { cloud_state: lbr_adapters::CloudState::Removed, registered_ips: HashSet::new() }
            }
            Err(error @ ConnectorError::Unavailable { .. }) => {
                tracing::warn!(%load_balancer_id, %error, "connector call failed, skipping this load balancer's associations");
                CloudQuery::Unavailable
            }
        };

        for association in associations {
            self.process_association(association, &load_balancer_id, &cloud).await;
        }
    }

    async fn process_association(&self, association: Association, load_balancer_id: &LoadBalancerId, cloud: &CloudQuery) {
        let job_id = association.job_id.clone();

        let tasks = match self.job_ops.get_tasks(&job_id).await {
            Ok(tasks) => {
                let mut running = Vec::with_capacity(tasks.len());
                for task in tasks {
                    match task.ip_address() {
                        Some(ip) => running.push(RunningTaskIp::new(task.task_id, ip)),
                        None => tracing::warn!(%job_id, task_id = %task.task_id, "running task has no usable ip, skipping"),
                    }
                }
                TaskQuery::Running(running)
            }
            Err(JobOpsError::JobNotFound(_)) => TaskQuery::JobNotFound,
            Err(error @ JobOpsError::Transient { .. }) => {
                tracing::warn!(%job_id, %error, "job ops call failed, skipping this association's rules");
                TaskQuery::Transient
            }
        };

        let stored = match self.store.get_targets(load_balancer_id).await {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!(%job_id, %load_balancer_id, %error, "failed to read stored targets, skipping association");
                return;
            }
        };

        let snapshot = Snapshot::new(job_id, load_balancer_id.clone(), association.state, tasks, cloud.clone(), stored);
        if snapshot.is_orphan() {
            tracing::debug!(
                job_id = %snapshot.job_id,
                load_balancer_id = %snapshot.load_balancer_id,
                "association is an orphan this tick"
            );
        }
        let outcome = PhaseEngine::evaluate(&snapshot, &self.cooldown);
        self.apply(&snapshot, outcome).await;
    }

    async fn apply(&self, snapshot: &Snapshot, outcome: lbr_engine::PhaseOutcome) {
        for mutation in outcome.mutations {
            let result = match mutation {
                StoreMutation::SetAssociationState(state) => {
                    self.store.put_association(snapshot.job_id.clone(), snapshot.load_balancer_id.clone(), state).await
                }
                StoreMutation::RemoveAssociation => {
                    self.store.remove_association(&snapshot.job_id, &snapshot.load_balancer_id).await
                }
                StoreMutation::PutTargets(targets) => self.store.put_targets(targets).await,
                StoreMutation::RemoveTargets(targets) => self.store.remove_targets(targets).await,
            };
            if let Err(error) = result {
                tracing::warn!(
                    job_id = %snapshot.job_id,
                    load_balancer_id = %snapshot.load_balancer_id,
                    %error,
                    "store write failed, skipping remaining mutations this tick"
                );
                break;
            }
        }

        for transition in outcome.transitions {
            tracing::debug!(
                target = %transition.identifier.ip,
                task_id = %transition.identifier.task_id,
                reason = ?transition.reason,
                state = ?transition.desired_state,
                "emitting target transition"
            );
            self.events.publish(transition);
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
