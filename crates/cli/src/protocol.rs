// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `herdctl` (control CLI) and `herdctld` (daemon).
//!
//! Wire format: 4-byte big-endian length prefix + JSON payload, one
//! request/response pair per connection. The daemon is the only process
//! that touches the state directory (§3 "Ownership"); the CLI never reads
//! `state.yaml` or `jobs/*` directly, so every query here has a matching
//! [`herdctl_fleet::FleetManager`] call on the daemon side.

use herdctl_core::{JobId, OutputRecord, ScheduleState};
use herdctl_fleet::{AgentInfo, FleetStatus, TriggerOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request from the control CLI to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check; the daemon replies `Response::Pong` once `running`.
    Ping,
    /// `getFleetStatus()` (§4.1).
    Status,
    /// `getAgentInfo(agent)` (§4.1).
    AgentInfo { agent: String },
    /// `getSchedules(agent)` (§4.1).
    Schedules { agent: String },
    /// `trigger(agent, schedule?, opts?)` (§4.1).
    Trigger {
        agent: String,
        #[serde(default)]
        schedule: Option<String>,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        bypass_concurrency_limit: bool,
    },
    /// `cancelJob(jobId, {timeout?})` (§4.1).
    CancelJob { job_id: JobId, #[serde(default)] timeout_ms: Option<u64> },
    /// `forkJob(jobId, opts)` (§4.1).
    ForkJob {
        job_id: JobId,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        schedule: Option<String>,
    },
    /// `enableSchedule(agent, schedule)` (§4.1).
    EnableSchedule { agent: String, schedule: String },
    /// `disableSchedule(agent, schedule)` (§4.1).
    DisableSchedule { agent: String, schedule: String },
    /// `reload()` (§4.1).
    Reload,
    /// `streamJobOutput(jobId, historyLimit?)` (§4.1). The daemon replies
    /// with a sequence of `Response::JobOutputLine`, terminated by
    /// `Response::JobOutputDone`.
    StreamJobOutput { job_id: JobId, #[serde(default)] history_limit: Option<usize> },
    /// `stop(opts)` (§4.1, §5). Asks the daemon to shut itself down.
    Stop {
        #[serde(default)]
        timeout_ms: Option<u64>,
        #[serde(default = "default_true")]
        wait_for_jobs: bool,
        #[serde(default = "default_true")]
        cancel_on_timeout: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Response from the daemon to the control CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Ok,
    Status { status: FleetStatus },
    AgentInfo { agent: AgentInfo },
    Schedules { schedules: HashMap<String, ScheduleState> },
    Triggered { outcome: TriggerOutcome },
    Cancelled { termination_type: String },
    Forked { outcome: TriggerOutcome },
    JobOutputLine { record: OutputRecord },
    JobOutputDone,
    Error { message: String },
}
