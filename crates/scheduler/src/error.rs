// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler errors (§7 "Scheduling errors").

/// Raised when a schedule cannot be evaluated (§4.2 "defence in depth": the
/// same cron expression is validated at config load *and* re-validated
/// here, since a malformed schedule should never silently stop firing).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulerError {
    #[error("unknown schedule {schedule:?} for agent {agent:?}")]
    UnknownSchedule { agent: String, schedule: String },

    #[error("schedule {schedule:?} for agent {agent:?} cannot be evaluated: {source}")]
    InvalidCron { agent: String, schedule: String, #[source] source: herdctl_core::CronParseError },
}
