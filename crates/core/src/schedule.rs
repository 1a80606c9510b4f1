// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule: a rule attached to an agent describing when it should fire (§3).

use crate::cron::CronParseError;
use serde::{Deserialize, Serialize};

/// Kind of schedule. `Webhook` and `Chat` carry no time field — they fire
/// only in response to an external event, never on the scheduler's tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Interval,
    Cron,
    Webhook,
    Chat,
}

crate::simple_display! {
    ScheduleKind {
        Interval => "interval",
        Cron => "cron",
        Webhook => "webhook",
        Chat => "chat",
    }
}

/// A schedule attached to an agent (`agent.schedules[name]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub kind: ScheduleKind,
    /// Required and meaningful only for `kind == Interval` (duration string, e.g. `5m`).
    #[serde(default)]
    pub interval: Option<String>,
    /// Required and meaningful only for `kind == Cron` (5-field cron expression).
    #[serde(default)]
    pub expression: Option<String>,
    /// Overrides the agent's default prompt when this schedule fires.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Invariant violation for a [`Schedule`] (§3 "Invariant": for `interval`,
/// `interval` is present; for `cron`, `expression` is present).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleConfigError {
    #[error("schedule of kind 'interval' is missing its interval field")]
    MissingInterval,
    #[error("schedule of kind 'cron' is missing its expression field")]
    MissingExpression,
    #[error("invalid interval duration: {0}")]
    InvalidInterval(String),
    #[error(transparent)]
    InvalidCron(#[from] CronParseError),
}

impl Schedule {
    /// Validate the kind/field invariant and, for time-driven kinds, that
    /// the time field itself parses (fail fast, §4.2).
    pub fn validate(&self) -> Result<(), ScheduleConfigError> {
        match self.kind {
            ScheduleKind::Interval => {
                let interval =
                    self.interval.as_deref().ok_or(ScheduleConfigError::MissingInterval)?;
                crate::duration::parse_duration(interval)
                    .map_err(ScheduleConfigError::InvalidInterval)?;
            }
            ScheduleKind::Cron => {
                let expression =
                    self.expression.as_deref().ok_or(ScheduleConfigError::MissingExpression)?;
                crate::cron::CronSchedule::parse(expression)?;
            }
            ScheduleKind::Webhook | ScheduleKind::Chat => {}
        }
        Ok(())
    }

    /// Whether the scheduler's tick loop should ever evaluate this schedule
    /// for a time-based fire (§4.2). Webhook/chat schedules only fire via
    /// the Fleet Manager's manual/external trigger paths.
    pub fn is_time_driven(&self) -> bool {
        matches!(self.kind, ScheduleKind::Interval | ScheduleKind::Cron)
    }
}

/// Status of a schedule's execution state (§3 "Schedule State").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Idle,
    Running,
    Disabled,
}

crate::simple_display! {
    ScheduleStatus {
        Idle => "idle",
        Running => "running",
        Disabled => "disabled",
    }
}

/// Persisted per-agent-per-schedule execution state (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub status: ScheduleStatus,
    #[serde(default)]
    pub last_run_at: Option<u64>,
    #[serde(default)]
    pub next_run_at: Option<u64>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self { status: ScheduleStatus::Idle, last_run_at: None, next_run_at: None, last_error: None }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
