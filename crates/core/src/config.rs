// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved, validated configuration shapes (§6.2 "Configuration").
//!
//! This module defines the shapes the rest of the crate depends on; parsing
//! the on-disk YAML into them is the external collaborator's job (the
//! `herdctl-config` crate), kept out of `herdctl-core` per the loader's
//! internal logic being out of scope.

use crate::agent::Agent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A single agent's fully-resolved, validated configuration (§3 "Agent").
///
/// Identical in shape to [`Agent`] — the distinction is provenance, not
/// structure: a `ResolvedAgent` has passed the loader's validation
/// (`herdctl-config`), while an [`Agent`] is the core's working type once
/// loaded. Kept as an alias rather than a second struct so the two can never
/// drift apart.
pub type ResolvedAgent = Agent;

/// Fleet-wide concurrency ceiling and other top-level settings (§5 "Fleet-wide cap").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub max_concurrent_jobs: Option<u32>,
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { max_concurrent_jobs: None, state_dir: None }
    }
}

/// The fully validated, ready-to-run configuration handed to the Fleet
/// Manager at `initialize()` (§6.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResolvedConfig {
    #[serde(default)]
    pub fleet: FleetConfig,
    pub agents: HashMap<String, ResolvedAgent>,
}

impl ResolvedConfig {
    /// Names of agents whose schedules changed shape between `self` and
    /// `other` relative to `self`, used to build the `config:reloaded` diff
    /// (§9 "Dynamic reload").
    pub fn diff_agent_names(&self, other: &ResolvedConfig) -> crate::event::ConfigDiff {
        let mut added = Vec::new();
        let mut removed = Vec::new();
        let mut modified = Vec::new();

        for name in other.agents.keys() {
            if !self.agents.contains_key(name) {
                added.push(name.clone());
            }
        }
        for (name, agent) in &self.agents {
            match other.agents.get(name) {
                None => removed.push(name.clone()),
                Some(new_agent) if new_agent != agent => modified.push(name.clone()),
                Some(_) => {}
            }
        }
        added.sort();
        removed.sort();
        modified.sort();
        let summary = format!(
            "{} added, {} removed, {} modified",
            added.len(),
            removed.len(),
            modified.len()
        );
        crate::event::ConfigDiff { added, removed, modified, summary }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
