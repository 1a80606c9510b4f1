// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime adapter errors (§7 "Job errors", transport cause for `job:failed`).

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to start agent process: {0}")]
    SpawnFailed(String),

    #[error("working directory does not exist: {0}")]
    WorkingDirectoryMissing(std::path::PathBuf),

    #[error("agent process exited with {status}: {detail}")]
    NonZeroExit { status: String, detail: String },

    #[error("io error talking to agent process: {0}")]
    Io(#[from] std::io::Error),
}
