// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic [`Runtime`] stand-in for tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::contract::{ExecuteRequest, Message, Runtime, RuntimeJob};
use crate::error::RuntimeError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A pre-scripted outcome for one `execute` call: the messages to yield, in
/// order, and whether cancellation is honoured (simulating a runtime that
/// ignores a graceful stop request, for escalation tests).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    pub messages: Vec<Message>,
    pub ignore_graceful_cancel: bool,
}

impl ScriptedRun {
    pub fn output(content: impl Into<String>) -> Self {
        Self {
            messages: vec![
                Message::Output { kind: herdctl_core::OutputRecordKind::Assistant, content: Some(content.into()) },
                Message::Done,
            ],
            ignore_graceful_cancel: false,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self { messages: vec![Message::Failed { reason: reason.into() }], ignore_graceful_cancel: false }
    }
}

#[derive(Default)]
struct Inner {
    scripted: VecDeque<ScriptedRun>,
    requests: Vec<ExecuteRequest>,
}

/// Hands out pre-scripted [`RuntimeJob`]s instead of spawning real processes.
///
/// Calls queue up in FIFO order: the Nth call to `execute` returns the Nth
/// script pushed via [`FakeRuntime::push`]. Calling `execute` with no
/// scripts queued returns [`RuntimeError::SpawnFailed`], which surfaces a
/// test's forgotten setup immediately instead of hanging.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, run: ScriptedRun) {
        self.inner.lock().scripted.push_back(run);
    }

    /// Requests passed to `execute`, in call order, for assertion.
    pub fn requests(&self) -> Vec<ExecuteRequest> {
        self.inner.lock().requests.clone()
    }
}

#[async_trait]
impl Runtime for FakeRuntime {
    async fn execute(&self, request: ExecuteRequest) -> Result<Box<dyn RuntimeJob>, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.requests.push(request.clone());
        let script = inner
            .scripted
            .pop_front()
            .ok_or_else(|| RuntimeError::SpawnFailed(format!("no scripted run queued for agent {:?}", request.agent)))?;
        Ok(Box::new(FakeJob { remaining: script.messages.into(), ignore_graceful_cancel: script.ignore_graceful_cancel, cancelled_forced: false }))
    }
}

struct FakeJob {
    remaining: VecDeque<Message>,
    ignore_graceful_cancel: bool,
    cancelled_forced: bool,
}

#[async_trait]
impl RuntimeJob for FakeJob {
    async fn next(&mut self) -> Option<Message> {
        if self.cancelled_forced {
            return None;
        }
        self.remaining.pop_front()
    }

    async fn cancel_graceful(&mut self) {
        if !self.ignore_graceful_cancel {
            self.remaining.clear();
            self.remaining.push_back(Message::Failed { reason: "cancelled".to_string() });
        }
    }

    async fn cancel_forced(&mut self) {
        self.cancelled_forced = true;
        self.remaining.clear();
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
