// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Runtime interface consumed by the Job Executor (§6.3).
//!
//! `Runtime` is deliberately thin: the core treats the underlying LLM call as
//! opaque and only records the messages it emits. Cancellation is split into
//! a graceful request (escalated by the Job Executor after its own grace
//! period) and a forced one, mirroring the daemon's spawn/kill split for
//! agent processes.

use async_trait::async_trait;
use herdctl_core::PermissionMode;
use std::path::PathBuf;

/// Parameters for a single job's agent invocation.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub agent: String,
    pub model: String,
    pub prompt: Option<String>,
    pub session_id: Option<String>,
    pub working_directory: PathBuf,
    pub permission_mode: PermissionMode,
    pub max_turns: Option<u32>,
    pub system_prompt: Option<String>,
}

/// One message emitted by a running agent invocation (§6.3 `{type, content?}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Output { kind: herdctl_core::OutputRecordKind, content: Option<String> },
    /// The invocation finished successfully; no further messages follow.
    Done,
    /// The invocation ended in failure; no further messages follow.
    Failed { reason: String },
}

/// A single in-flight agent invocation (§6.3 "lazy, cancellable sequence").
///
/// Messages are pulled one at a time rather than pushed, so a caller that
/// stops polling (e.g. a cancelled job) never forces the adapter to buffer
/// an unbounded backlog.
#[async_trait]
pub trait RuntimeJob: Send {
    /// Pull the next message. Returns `None` once the stream is exhausted —
    /// which only happens after a [`Message::Done`] or [`Message::Failed`].
    async fn next(&mut self) -> Option<Message>;

    /// Request graceful termination (e.g. SIGTERM, or closing stdin).
    /// The stream may continue to yield messages until the process exits.
    async fn cancel_graceful(&mut self);

    /// Force termination immediately (e.g. SIGKILL). Always followed by the
    /// stream ending, though not necessarily with an explicit `Failed`.
    async fn cancel_forced(&mut self);
}

/// Adapter that executes agent invocations (§6.3 "Runtime interface").
#[async_trait]
pub trait Runtime: Send + Sync + 'static {
    async fn execute(&self, request: ExecuteRequest) -> Result<Box<dyn RuntimeJob>, crate::error::RuntimeError>;
}
