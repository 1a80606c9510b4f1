// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted fleet-wide and per-agent state (§3 "Agent State", "Fleet State").

use crate::id::JobId;
use crate::schedule::ScheduleState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Running,
    Error,
}

crate::simple_display! {
    AgentStatus {
        Idle => "idle",
        Running => "running",
        Error => "error",
    }
}

/// Persisted per-agent state: current/last job pointers plus one
/// [`ScheduleState`] per configured schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub status: AgentStatus,
    #[serde(default)]
    pub current_job: Option<JobId>,
    #[serde(default)]
    pub last_job: Option<JobId>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub schedules: HashMap<String, ScheduleState>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            status: AgentStatus::Idle,
            current_job: None,
            last_job: None,
            error_message: None,
            schedules: HashMap::new(),
        }
    }
}

/// Singleton fleet-wide persisted state (`state.yaml`'s `fleet` key).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetMeta {
    #[serde(default)]
    pub started_at: Option<u64>,
    #[serde(default)]
    pub stopped_at: Option<u64>,
}

/// The full persisted document at `<stateDir>/state.yaml` (§6.1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetState {
    #[serde(default)]
    pub fleet: FleetMeta,
    #[serde(default)]
    pub agents: HashMap<String, AgentState>,
}

#[cfg(test)]
#[path = "fleet_state_tests.rs"]
mod tests;
