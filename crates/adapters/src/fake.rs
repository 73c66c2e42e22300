// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `Connector`/`JobOps` implementations for exercising the engine and
//! the loop driver without a real cloud API or job manager.

use crate::connector::{CloudLoadBalancerView, Connector, ConnectorError};
use crate::jobops::{JobHandle, JobOps, JobOpsError, RunningTask};
use async_trait::async_trait;
use lbr_core::{JobId, LoadBalancerId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// What a fake connector call should do for one load balancer.
#[derive(Clone)]
enum ConnectorResponse {
    View(CloudLoadBalancerView),
    Error(Arc<dyn Fn(&LoadBalancerId) -> ConnectorError + Send + Sync>),
}

/// A `Connector` whose per-load-balancer responses are set up by the test.
#[derive(Clone, Default)]
pub struct FakeConnector {
    responses: Arc<Mutex<HashMap<LoadBalancerId, ConnectorResponse>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next (and all subsequent, until changed) calls for `lb` return `view`.
    pub fn set_view(&self, lb: LoadBalancerId, view: CloudLoadBalancerView) {
        self.responses.lock().insert(lb, ConnectorResponse::View(view));
    }

    /// The next (and all subsequent, until changed) calls for `lb` fail as transient.
    pub fn set_unavailable(&self, lb: LoadBalancerId, message: impl Into<String>) {
        let message = message.into();
        self.responses.lock().insert(
            lb,
            ConnectorResponse::Error(Arc::new(move |lb_id| ConnectorError::Unavailable {
                load_balancer_id: lb_id.clone(),
                message: message.clone(),
            })),
        );
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn get_load_balancer(&self, load_balancer_id: &LoadBalancerId) -> Result<CloudLoadBalancerView, ConnectorError> {
        match self.responses.lock().get(load_balancer_id) {
            Some(ConnectorResponse::View(view)) => Ok(view.clone()),
            Some(ConnectorResponse::Error(make_err)) => Err(make_err(load_balancer_id)),
            None => Err(ConnectorError::NotFound(load_balancer_id.clone())),
        }
    }
}

#[derive(Clone)]
enum JobOpsResponse {
    Tasks(Vec<RunningTask>),
    Transient(String),
}

/// A `JobOps` whose per-job task lists and existence are set up by the test.
#[derive(Clone, Default)]
pub struct FakeJobOps {
    tasks: Arc<Mutex<HashMap<JobId, JobOpsResponse>>>,
    jobs: Arc<Mutex<HashMap<JobId, bool>>>,
}

impl FakeJobOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// `job` exists and its running tasks are `tasks`.
    pub fn set_tasks(&self, job: JobId, tasks: Vec<RunningTask>) {
        self.jobs.lock().insert(job.clone(), true);
        self.tasks.lock().insert(job, JobOpsResponse::Tasks(tasks));
    }

    /// `get_tasks` fails transiently; `get_job` still reports the job exists
    /// unless `remove_job` is also called.
    pub fn set_transient_error(&self, job: JobId, message: impl Into<String>) {
        self.jobs.lock().insert(job.clone(), true);
        self.tasks.lock().insert(job, JobOpsResponse::Transient(message.into()));
    }

    /// `job` does not exist: `get_tasks` returns job-not-found, `get_job`
    /// returns `None`.
    pub fn remove_job(&self, job: &JobId) {
        self.jobs.lock().remove(job);
        self.tasks.lock().remove(job);
    }
}

#[async_trait]
impl JobOps for FakeJobOps {
    async fn get_tasks(&self, job_id: &JobId) -> Result<Vec<RunningTask>, JobOpsError> {
        if !self.jobs.lock().get(job_id).copied().unwrap_or(false) {
            return Err(JobOpsError::JobNotFound(job_id.clone()));
        }
        match self.tasks.lock().get(job_id) {
            Some(JobOpsResponse::Tasks(tasks)) => Ok(tasks.clone()),
            Some(JobOpsResponse::Transient(message)) => {
                Err(JobOpsError::Transient { job_id: job_id.clone(), message: message.clone() })
            }
            None => Ok(Vec::new()),
        }
    }

    async fn get_job(&self, job_id: &JobId) -> Result<Option<JobHandle>, JobOpsError> {
        if self.jobs.lock().get(job_id).copied().unwrap_or(false) {
            Ok(Some(JobHandle { job_id: job_id.clone() }))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
