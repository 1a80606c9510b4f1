// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable state layer error type (§7 "Error Taxonomy").

use std::path::PathBuf;

/// Errors raised by the durable state layer (§4.4, §6.1).
///
/// Every variant names the attempted operation, the conflicting path or
/// value, and (where one exists) an actionable hint, per §7's error context
/// requirement.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(
        "refusing to write outside the state directory: component {component:?} of path {attempted:?} escapes {state_dir:?}"
    )]
    UnsafePath { state_dir: PathBuf, attempted: PathBuf, component: String },

    #[error("state file {path:?} is malformed: {reason} (hint: delete or hand-repair the file, then retry)")]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to {operation} {path:?}: {source}")]
    Io { operation: &'static str, path: PathBuf, #[source] source: std::io::Error },
}

impl StateError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { operation, path: path.into(), source }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
