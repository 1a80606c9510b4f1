// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent: a named, configuration-defined unit of work (§3 "Agent").

use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validate an agent name against `^[A-Za-z0-9][A-Za-z0-9_-]*$`.
pub fn is_valid_agent_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Permission mode granted to an agent's runtime invocation. Opaque to the
/// core beyond being carried through to the runtime (§6.3) — the set of
/// valid values is owned by the runtime adapter, not specified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMode(pub String);

impl From<&str> for PermissionMode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Static, configuration-defined agent definition. Immutable within a reload
/// cycle; a job snapshots the fields it needs at creation time so a running
/// job is unaffected by a later `reload()` (§4.1 "Reload contract").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub model: String,
    pub working_directory: std::path::PathBuf,
    pub permission_mode: PermissionMode,
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
    #[serde(default)]
    pub schedules: HashMap<String, Schedule>,
}

fn default_max_concurrent() -> u32 {
    1
}

impl Agent {
    /// Resolve the effective prompt for a trigger, applying precedence
    /// `opts.prompt > schedule.prompt > agent default` (§4.1 "trigger").
    pub fn resolve_prompt(
        &self,
        opts_prompt: Option<&str>,
        schedule_name: Option<&str>,
    ) -> Option<String> {
        if let Some(p) = opts_prompt {
            return Some(p.to_string());
        }
        if let Some(name) = schedule_name {
            if let Some(schedule) = self.schedules.get(name) {
                if let Some(p) = &schedule.prompt {
                    return Some(p.clone());
                }
            }
        }
        self.system_prompt.clone()
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        into {
            name: String = "scout",
            description: String = "",
            model: String = "test-model",
            permission_mode: PermissionMode = PermissionMode::from("default"),
        }
        set {
            working_directory: std::path::PathBuf = std::path::PathBuf::from("/tmp"),
            max_turns: Option<u32> = None,
            system_prompt: Option<String> = None,
            max_concurrent: u32 = 1,
            schedules: HashMap<String, Schedule> = HashMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
