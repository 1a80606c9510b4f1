// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path layout and containment checks for the state directory (§6.1).
//!
//! ```text
//! <state_dir>/
//!   state.yaml
//!   jobs/<job_id>/metadata.yaml
//!   jobs/<job_id>/output.jsonl
//!   sessions/<agent>.json
//! ```

use crate::error::StateError;
use herdctl_core::JobId;
use std::path::{Component, Path, PathBuf};

/// Reject any path component that could escape the state directory
/// (`..`, absolute roots, path separators smuggled into an id/name).
fn reject_escaping_components(state_dir: &Path, candidate: &Path) -> Result<(), StateError> {
    for component in candidate.strip_prefix(state_dir).unwrap_or(candidate).components() {
        match component {
            Component::Normal(_) => {}
            other => {
                return Err(StateError::UnsafePath {
                    state_dir: state_dir.to_path_buf(),
                    attempted: candidate.to_path_buf(),
                    component: format!("{other:?}"),
                });
            }
        }
    }
    Ok(())
}

pub fn state_file(state_dir: &Path) -> PathBuf {
    state_dir.join("state.yaml")
}

pub fn jobs_dir(state_dir: &Path) -> PathBuf {
    state_dir.join("jobs")
}

pub fn job_dir(state_dir: &Path, job_id: &JobId) -> Result<PathBuf, StateError> {
    let path = jobs_dir(state_dir).join(job_id.as_str());
    reject_escaping_components(state_dir, &path)?;
    Ok(path)
}

pub fn job_metadata_file(state_dir: &Path, job_id: &JobId) -> Result<PathBuf, StateError> {
    Ok(job_dir(state_dir, job_id)?.join("metadata.yaml"))
}

pub fn job_output_file(state_dir: &Path, job_id: &JobId) -> Result<PathBuf, StateError> {
    Ok(job_dir(state_dir, job_id)?.join("output.jsonl"))
}

pub fn sessions_dir(state_dir: &Path) -> PathBuf {
    state_dir.join("sessions")
}

/// `sessions/<agent>.json`. `agent` is validated by `herdctl_core::is_valid_agent_name`
/// upstream, but path containment is re-checked here regardless (defense in depth
/// against a caller that skipped validation).
pub fn session_file(state_dir: &Path, agent: &str) -> Result<PathBuf, StateError> {
    let path = sessions_dir(state_dir).join(format!("{agent}.json"));
    reject_escaping_components(state_dir, &path)?;
    Ok(path)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
