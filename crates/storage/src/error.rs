// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by an [`crate::AssociationStore`] implementation.
///
/// A write failure is never fatal to the reconciler: the phase engine is
/// pure, so the next tick recomputes from whatever state actually made it
/// to the store and emits again. See `Store-write-failure` in the error
/// handling policy.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write association ({job_id}, {load_balancer_id}): {message}")]
    PutAssociationFailed { job_id: String, load_balancer_id: String, message: String },

    #[error("failed to remove association ({job_id}, {load_balancer_id}): {message}")]
    RemoveAssociationFailed { job_id: String, load_balancer_id: String, message: String },

    #[error("failed to write {count} target record(s) for {load_balancer_id}: {message}")]
    PutTargetsFailed { load_balancer_id: String, count: usize, message: String },

    #[error("failed to remove {count} target record(s): {message}")]
    RemoveTargetsFailed { count: usize, message: String },

    #[error("failed to read store: {0}")]
    ReadFailed(String),
}
