// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use herdctl_core::JobId;

#[test]
fn job_metadata_file_is_under_jobs_dir() {
    let state_dir = PathBuf::from("/var/herdctl");
    let job_id = JobId::new(1_700_000_000_000);

    let path = job_metadata_file(&state_dir, &job_id).expect("safe path");

    assert!(path.starts_with(state_dir.join("jobs").join(job_id.as_str())));
    assert_eq!(path.file_name().unwrap(), "metadata.yaml");
}

#[test]
fn session_file_rejects_path_traversal_in_agent_name() {
    let state_dir = PathBuf::from("/var/herdctl");
    let err = session_file(&state_dir, "../../etc/passwd").unwrap_err();
    assert!(matches!(err, StateError::UnsafePath { .. }));
}

#[test]
fn session_file_accepts_ordinary_agent_names() {
    let state_dir = PathBuf::from("/var/herdctl");
    let path = session_file(&state_dir, "scout").expect("safe path");
    assert_eq!(path, state_dir.join("sessions").join("scout.json"));
}
