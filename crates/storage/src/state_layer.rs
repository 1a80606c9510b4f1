// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable state layer's public surface (§4.4).
//!
//! One [`StateLayer`] owns one state directory for the lifetime of a Fleet
//! Manager. `initialize()` is idempotent at the filesystem level (§8
//! "Round-trip/idempotence laws"): run on an already-populated directory it
//! creates no new files and changes no existing content.

use crate::atomic::{append_line, write_atomic};
use crate::error::StateError;
use crate::paths;
use herdctl_core::{FleetState, Job, JobId, OutputRecord, Session};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-path mutex registry. A lock is created lazily on first use and kept
/// for the lifetime of the [`StateLayer`] so repeated writers to the same
/// path always serialize against each other, never against an unrelated path.
#[derive(Default)]
struct PathLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks.lock().entry(path.to_path_buf()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

/// Owns one state directory and funnels every mutation through an atomic
/// replace (or append, for output) guarded by a per-path mutex (§4.4).
pub struct StateLayer {
    state_dir: PathBuf,
    locks: PathLocks,
}

impl StateLayer {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { state_dir: state_dir.into(), locks: PathLocks::default() }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Create missing directories, create `state.yaml` with `{fleet:{},
    /// agents:{}}` if absent, and validate it if present. A malformed
    /// existing file aborts initialization with [`StateError::Malformed`]
    /// (§4.4 "Recovery").
    pub fn initialize(&self) -> Result<(), StateError> {
        std::fs::create_dir_all(&self.state_dir)
            .map_err(|e| StateError::io("create directory", &self.state_dir, e))?;
        std::fs::create_dir_all(paths::jobs_dir(&self.state_dir))
            .map_err(|e| StateError::io("create directory", paths::jobs_dir(&self.state_dir), e))?;
        std::fs::create_dir_all(paths::sessions_dir(&self.state_dir))
            .map_err(|e| StateError::io("create directory", paths::sessions_dir(&self.state_dir), e))?;

        let path = paths::state_file(&self.state_dir);
        if !path.exists() {
            self.write_fleet_state(&FleetState::default())?;
            return Ok(());
        }
        // Validate without rewriting: initialize() must be a filesystem no-op
        // on an already-populated directory (§8 idempotence law).
        self.read_fleet_state()?;
        Ok(())
    }

    // -- fleet / agent state --------------------------------------------

    pub fn read_fleet_state(&self) -> Result<FleetState, StateError> {
        let path = paths::state_file(&self.state_dir);
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        read_yaml(&path)
    }

    pub fn write_fleet_state(&self, state: &FleetState) -> Result<(), StateError> {
        let path = paths::state_file(&self.state_dir);
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        write_yaml(&path, state)
    }

    /// Read-modify-write `state.yaml` under the path's mutex so the
    /// read-then-write is not interleaved with another mutator of the same
    /// file within this process.
    pub fn update_fleet_state<F>(&self, f: F) -> Result<FleetState, StateError>
    where
        F: FnOnce(&mut FleetState),
    {
        let path = paths::state_file(&self.state_dir);
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        let mut state: FleetState = read_yaml(&path)?;
        f(&mut state);
        write_yaml(&path, &state)?;
        Ok(state)
    }

    // -- job metadata -----------------------------------------------------

    pub fn read_job(&self, job_id: &JobId) -> Result<Job, StateError> {
        let path = paths::job_metadata_file(&self.state_dir, job_id)?;
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        read_yaml(&path)
    }

    pub fn try_read_job(&self, job_id: &JobId) -> Result<Option<Job>, StateError> {
        let path = paths::job_metadata_file(&self.state_dir, job_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        Ok(Some(read_yaml(&path)?))
    }

    pub fn write_job(&self, job: &Job) -> Result<(), StateError> {
        let path = paths::job_metadata_file(&self.state_dir, &job.id)?;
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        write_yaml(&path, job)
    }

    /// All job ids with a metadata file on disk, for recovery scans.
    pub fn list_job_ids(&self) -> Result<Vec<JobId>, StateError> {
        let dir = paths::jobs_dir(&self.state_dir);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| StateError::io("read directory", &dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StateError::io("read directory entry", &dir, e))?;
            if let Some(name) = entry.file_name().to_str() {
                ids.push(JobId::from_string(name.to_string()));
            }
        }
        ids.sort();
        Ok(ids)
    }

    // -- job output --------------------------------------------------------

    /// Append one output record. Not fsynced per-record (§4.4 "Write
    /// discipline" — losing the tail line on crash is acceptable).
    pub fn append_output(&self, job_id: &JobId, record: &OutputRecord) -> Result<(), StateError> {
        let path = paths::job_output_file(&self.state_dir, job_id)?;
        let line = serde_json::to_string(record)
            .map_err(|e| StateError::Malformed { path: path.clone(), reason: e.to_string() })?;
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        append_line(&path, &line)
    }

    /// Read every output record for a job. A trailing partial or malformed
    /// line is skipped with a `warn` log rather than aborting the read
    /// (§4.4 "Recovery").
    pub fn read_output(&self, job_id: &JobId) -> Result<Vec<OutputRecord>, StateError> {
        let path = paths::job_output_file(&self.state_dir, job_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        let contents = std::fs::read_to_string(&path).map_err(|e| StateError::io("read", &path, e))?;
        let mut records = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<OutputRecord>(line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        %job_id, path = %path.display(), line = lineno + 1, error = %err,
                        "skipping unparseable output line"
                    );
                }
            }
        }
        Ok(records)
    }

    // -- sessions ------------------------------------------------------

    pub fn read_session(&self, agent: &str) -> Result<Option<Session>, StateError> {
        let path = paths::session_file(&self.state_dir, agent)?;
        if !path.exists() {
            return Ok(None);
        }
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        let contents = std::fs::read_to_string(&path).map_err(|e| StateError::io("read", &path, e))?;
        let session = serde_json::from_str(&contents)
            .map_err(|e| StateError::Malformed { path: path.clone(), reason: e.to_string() })?;
        Ok(Some(session))
    }

    pub fn write_session(&self, agent: &str, session: &Session) -> Result<(), StateError> {
        let path = paths::session_file(&self.state_dir, agent)?;
        let _path_lock = self.locks.lock_for(&path);
        let _guard = _path_lock.lock();
        let contents = serde_json::to_vec_pretty(session)
            .map_err(|e| StateError::Malformed { path: path.clone(), reason: e.to_string() })?;
        write_atomic(&path, &contents)
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StateError> {
    let contents = std::fs::read_to_string(path).map_err(|e| StateError::io("read", path, e))?;
    serde_yaml::from_str(&contents)
        .map_err(|e| StateError::Malformed { path: path.to_path_buf(), reason: e.to_string() })
}

fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
    let contents = serde_yaml::to_string(value)
        .map_err(|e| StateError::Malformed { path: path.to_path_buf(), reason: e.to_string() })?;
    write_atomic(path, contents.as_bytes())
}

#[cfg(test)]
#[path = "state_layer_tests.rs"]
mod tests;
