// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session: an optional, resumable conversation context per agent (§3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Autonomous,
    Interactive,
    Review,
}

crate::simple_display! {
    SessionMode {
        Autonomous => "autonomous",
        Interactive => "interactive",
        Review => "review",
    }
}

/// Per-agent session record enabling conversation resume/fork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: u64,
    pub last_used_at: u64,
    #[serde(default)]
    pub job_count: u32,
    pub mode: SessionMode,
    pub working_directory: std::path::PathBuf,
    pub runtime_type: String,
    #[serde(default)]
    pub docker_enabled: bool,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
