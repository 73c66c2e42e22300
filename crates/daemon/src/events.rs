// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Event Stream: a fan-in of `TargetTransition`s for the downstream
//! batching engine, backed by a `tokio::sync::broadcast` channel.

use lbr_core::TargetTransition;
use tokio::sync::broadcast;

/// Unbounded from the reconciler's perspective; per `spec.md` §4.4 the
/// downstream batcher owns backpressure and deduplication. `broadcast`'s
/// own semantics already give us "late subscribers see only subsequent
/// events" for free.
const CHANNEL_CAPACITY: usize = 1024;

pub struct EventStream {
    sender: broadcast::Sender<TargetTransition>,
}

impl EventStream {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TargetTransition> {
        self.sender.subscribe()
    }

    /// Publish a transition. Errors (no active subscribers) are not
    /// actionable and are dropped.
    pub fn publish(&self, transition: TargetTransition) {
        let _ = self.sender.send(transition);
    }
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}
