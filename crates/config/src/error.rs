// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading errors (§7 "Configuration errors").

use std::path::PathBuf;

/// Failure to load a [`crate::load`]-able configuration file.
///
/// Every variant names the attempted operation, the offending path/value,
/// and — where one exists — an actionable hint, per §7's error-context
/// requirement. The original cause is always preserved via `#[source]`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file {path:?}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse configuration file {path:?}: {source}")]
    Parse { path: PathBuf, #[source] source: serde_yaml::Error },

    #[error(
        "agent {name:?} has an invalid name (must match ^[A-Za-z0-9][A-Za-z0-9_-]*$)"
    )]
    InvalidAgentName { name: String },

    #[error("agent {agent:?} schedule {schedule:?} is invalid: {source} (hint: example cron \"0 0 * * *\", example interval \"5m\")")]
    InvalidSchedule { agent: String, schedule: String, #[source] source: herdctl_core::ScheduleConfigError },

    #[error("agent {agent:?} schedule {schedule:?} has unknown type {kind:?} (expected interval, cron, webhook, or chat)")]
    UnknownScheduleKind { agent: String, schedule: String, kind: String },
}
