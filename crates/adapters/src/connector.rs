// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cloud load balancer connector: a read-only view of what the cloud
//! API currently thinks is registered. The reconciler never writes through
//! this trait — that's the downstream batching engine's job.

use async_trait::async_trait;
use lbr_core::{IpAddress, LoadBalancerId};
use std::collections::HashSet;
use thiserror::Error;

/// Whether the cloud still considers the load balancer to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudState {
    Active,
    /// The load balancer was mutated or deleted out-of-band. Treated as an
    /// orphan trigger — see `spec.md` §4.2's orphan detection.
    Removed,
}

/// A point-in-time read of a load balancer's membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudLoadBalancerView {
    pub cloud_state: CloudState,
    pub registered_ips: HashSet<IpAddress>,
}

impl CloudLoadBalancerView {
    pub fn new(cloud_state: CloudState, registered_ips: HashSet<IpAddress>) -> Self {
        Self { cloud_state, registered_ips }
    }
}

/// Failures from reading the cloud load balancer. Every failure is isolated
/// to the `load_balancer_id` that triggered it — see `Connector-transient`
/// in the error handling policy.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("load balancer {0} not found in the cloud")]
    NotFound(LoadBalancerId),
    #[error("connector call for {load_balancer_id} failed: {message}")]
    Unavailable { load_balancer_id: LoadBalancerId, message: String },
}

/// Reads current load balancer membership from the cloud.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn get_load_balancer(&self, load_balancer_id: &LoadBalancerId) -> Result<CloudLoadBalancerView, ConnectorError>;
}
