// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serde mirror of the on-disk YAML (§6.2 "Configuration (inputs consumed)").
//!
//! Kept distinct from [`herdctl_core::Agent`]/[`herdctl_core::Schedule`]
//! because the on-disk shape is more permissive (optional fields, the
//! `instances.max_concurrent` override) than the validated in-memory types —
//! [`crate::load`] is the only place the two are reconciled.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFleet {
    #[serde(default)]
    pub concurrency: Option<u32>,
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    /// Opaque dashboard/connector configuration (§1 "Out of scope").
    #[serde(default)]
    pub web: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInstances {
    #[serde(default)]
    pub max_concurrent: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSchedule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAgent {
    #[serde(default)]
    pub description: String,
    pub model: String,
    pub working_directory: PathBuf,
    #[serde(default = "default_permission_mode")]
    pub permission_mode: String,
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub max_concurrent: Option<u32>,
    #[serde(default)]
    pub instances: RawInstances,
    #[serde(default)]
    pub schedules: HashMap<String, RawSchedule>,
}

fn default_permission_mode() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub fleet: RawFleet,
    #[serde(default)]
    pub agents: HashMap<String, RawAgent>,
}
