// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herdctl-config: loads and validates the on-disk YAML fleet configuration
//! into a [`ResolvedConfig`] (§6.2).
//!
//! The loader's internal logic is out of core scope per §1 ("treated as
//! external collaborators whose interface we specify") — this crate exists
//! so the rest of herdctl has a real, runnable implementation to call. It
//! validates eagerly and fails fast: an invalid agent name, a malformed
//! schedule, or an unparseable cron expression is rejected here rather than
//! surfacing later at schedule-evaluation time (§4.2 "defence in depth").

pub mod error;
pub mod raw;

pub use error::ConfigError;

use herdctl_core::{is_valid_agent_name, Agent, FleetConfig, PermissionMode, ResolvedConfig, Schedule, ScheduleKind};
use raw::RawConfig;
use std::collections::HashMap;
use std::path::Path;

/// Parse the on-disk schedule `type` string into a [`ScheduleKind`].
fn parse_schedule_kind(raw: &str) -> Option<ScheduleKind> {
    match raw {
        "interval" => Some(ScheduleKind::Interval),
        "cron" => Some(ScheduleKind::Cron),
        "webhook" => Some(ScheduleKind::Webhook),
        "chat" => Some(ScheduleKind::Chat),
        _ => None,
    }
}

/// Load and validate `path` into a [`ResolvedConfig`] (§6.2).
///
/// Validation performed here, all fail-fast:
/// - agent names match `^[A-Za-z0-9][A-Za-z0-9_-]*$` (§3 "Agent")
/// - each schedule's kind/field invariant holds (§3 "Schedule")
/// - interval durations and cron expressions parse (§4.2 "fail fast")
pub fn load(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })?;
    let raw: RawConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })?;
    resolve(raw)
}

/// Validate and resolve an already-parsed [`RawConfig`] (split out from
/// [`load`] so tests can exercise validation without touching the filesystem).
pub fn resolve(raw: RawConfig) -> Result<ResolvedConfig, ConfigError> {
    let mut agents = HashMap::with_capacity(raw.agents.len());

    for (name, raw_agent) in raw.agents {
        if !is_valid_agent_name(&name) {
            return Err(ConfigError::InvalidAgentName { name });
        }

        let mut schedules = HashMap::with_capacity(raw_agent.schedules.len());
        for (schedule_name, raw_schedule) in raw_agent.schedules {
            let kind = parse_schedule_kind(&raw_schedule.kind).ok_or_else(|| ConfigError::UnknownScheduleKind {
                agent: name.clone(),
                schedule: schedule_name.clone(),
                kind: raw_schedule.kind.clone(),
            })?;
            let schedule = Schedule {
                kind,
                interval: raw_schedule.interval,
                expression: raw_schedule.expression,
                prompt: raw_schedule.prompt,
            };
            schedule.validate().map_err(|source| ConfigError::InvalidSchedule {
                agent: name.clone(),
                schedule: schedule_name.clone(),
                source,
            })?;
            schedules.insert(schedule_name, schedule);
        }

        let max_concurrent = raw_agent
            .instances
            .max_concurrent
            .or(raw_agent.max_concurrent)
            .unwrap_or(1);

        let agent = Agent {
            name: name.clone(),
            description: raw_agent.description,
            model: raw_agent.model,
            working_directory: raw_agent.working_directory,
            permission_mode: PermissionMode::from(raw_agent.permission_mode.as_str()),
            max_turns: raw_agent.max_turns,
            system_prompt: raw_agent.system_prompt,
            max_concurrent,
            schedules,
        };
        agents.insert(name, agent);
    }

    let fleet = FleetConfig { max_concurrent_jobs: raw.fleet.concurrency, state_dir: raw.fleet.state_dir };
    tracing::debug!(agents = agents.len(), "resolved configuration");
    Ok(ResolvedConfig { fleet, agents })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
