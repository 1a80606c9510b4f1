// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet Manager errors (§7 "Lifecycle errors", "Job errors", "Shutdown errors").
//!
//! Every variant carries the attempted operation, the conflicting value, and
//! (where one exists) an actionable hint, per §7's error-context requirement.
//! Lower-level crate errors are folded in via `#[from]` rather than re-wrapped
//! in a free-form string, so a cause is never discarded.

use crate::lifecycle::FleetLifecycle;
use herdctl_core::JobId;

/// Why a fork could not proceed (§7 `JobForkError(reason)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobForkReason {
    JobNotFound,
    AgentNotFound,
    NoSession,
}

herdctl_core::simple_display! {
    JobForkReason {
        JobNotFound => "job_not_found",
        AgentNotFound => "agent_not_found",
        NoSession => "no_session",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("{method} is not permitted while the fleet is {current} (hint: valid states are {valid:?})")]
    InvalidState { method: &'static str, current: FleetLifecycle, valid: &'static [FleetLifecycle] },

    #[error("unknown agent {agent:?} (hint: check the agent name against the loaded configuration)")]
    UnknownAgent { agent: String },

    #[error("job {job_id} was not found (hint: it may already have been pruned from the state directory)")]
    JobNotFound { job_id: JobId },

    #[error("cannot fork job {job_id}: {reason}")]
    JobFork { job_id: JobId, reason: JobForkReason },

    #[error("shutdown did not complete within the deadline (hint: pass cancel_on_timeout or a longer timeout)")]
    Shutdown { timed_out: bool },

    #[error(transparent)]
    Scheduler(#[from] herdctl_scheduler::SchedulerError),

    #[error(transparent)]
    Concurrency(#[from] herdctl_queue::ConcurrencyLimitError),

    #[error(transparent)]
    State(#[from] herdctl_storage::StateError),
}
