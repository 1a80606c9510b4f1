// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response shapes for the Fleet Manager's public API (§4.1).

use crate::lifecycle::FleetLifecycle;
use herdctl_core::{AgentStatus, JobId, ScheduleState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// `trigger(agent, schedule?, opts?)` options (§4.1 "trigger").
#[derive(Debug, Clone, Default)]
pub struct TriggerOptions {
    pub prompt: Option<String>,
    pub bypass_concurrency_limit: bool,
}

/// `forkJob(jobId, opts)` options (§4.1 "forkJob").
#[derive(Debug, Clone, Default)]
pub struct ForkOptions {
    pub prompt: Option<String>,
    pub schedule: Option<String>,
}

/// `stop(opts)` options (§5 "Cancellation & timeouts").
#[derive(Debug, Clone)]
pub struct StopOptions {
    pub timeout: Duration,
    pub wait_for_jobs: bool,
    pub cancel_on_timeout: bool,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), wait_for_jobs: true, cancel_on_timeout: true }
    }
}

/// Result of an admitted `trigger`/`forkJob` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutcome {
    pub job_id: JobId,
    pub agent: String,
    pub schedule: Option<String>,
    pub started_at: u64,
    pub prompt: Option<String>,
}

/// A point-in-time snapshot of one agent (§4.1 "getAgentInfo").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub status: AgentStatus,
    pub current_job: Option<JobId>,
    pub last_job: Option<JobId>,
    pub error_message: Option<String>,
    pub max_concurrent: u32,
    pub running_count: u32,
    pub queue_len: usize,
}

/// A point-in-time snapshot of the whole fleet (§4.1 "getFleetStatus").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetStatus {
    pub lifecycle: FleetLifecycle,
    pub started_at: Option<u64>,
    pub stopped_at: Option<u64>,
    pub agents: HashMap<String, AgentInfo>,
}

/// A named schedule's current state (§4.1 "getSchedules").
pub type ScheduleSnapshot = HashMap<String, ScheduleState>;
