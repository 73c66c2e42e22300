// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job manager read contract: enumerate a job's running tasks, or look
//! up a job by id to detect orphans.

use async_trait::async_trait;
use lbr_core::{IpAddress, JobId, TaskId};
use std::collections::HashMap;
use thiserror::Error;

/// The context key a task's IP address is carried under. JobOps returns a
/// free-form context map per task rather than a fixed struct because the
/// job manager's task representation is external and opaque beyond this one
/// well-known field.
pub const IP_ADDRESS_CONTEXT_KEY: &str = "container_ip";

/// A single running task as reported by the job manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningTask {
    pub task_id: TaskId,
    pub context: HashMap<String, String>,
}

impl RunningTask {
    pub fn new(task_id: TaskId, ip: IpAddress) -> Self {
        let mut context = HashMap::new();
        context.insert(IP_ADDRESS_CONTEXT_KEY.to_string(), ip.to_string());
        Self { task_id, context }
    }

    /// The task's container IP, if the context carries a valid one under
    /// the well-known key.
    pub fn ip_address(&self) -> Option<IpAddress> {
        self.context.get(IP_ADDRESS_CONTEXT_KEY).and_then(|s| IpAddress::parse(s).ok())
    }
}

/// Opaque handle confirming a job exists, returned by `JobOps::get_job`.
/// The job manager's own fields are out of scope for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
}

/// Failures from `JobOps::get_tasks`/`get_job`.
///
/// `JobNotFound` is the orphan signal (policy: mark the association as an
/// orphan); every other variant is transient (policy: skip this
/// association's phases this tick, retry next tick).
#[derive(Debug, Error)]
pub enum JobOpsError {
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("job operations call for {job_id} failed: {message}")]
    Transient { job_id: JobId, message: String },
}

/// Reads a job's currently running tasks and job existence from the job
/// manager.
#[async_trait]
pub trait JobOps: Send + Sync {
    async fn get_tasks(&self, job_id: &JobId) -> Result<Vec<RunningTask>, JobOpsError>;
    async fn get_job(&self, job_id: &JobId) -> Result<Option<JobHandle>, JobOpsError>;
}
