// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic-replace file writes (§4.4 "Durable State Layer", §6.1).
//!
//! Every write creates a temp file in the same directory as its target (so
//! the final rename is on the same filesystem, and therefore atomic on the
//! platforms herdctl targets) and renames it into place. A reader never
//! observes a partially-written file.

use crate::error::StateError;
use std::io::Write;
use std::path::Path;

/// Write `contents` to `path` via a same-directory temp file + rename.
/// Creates parent directories as needed (§6.1: the state directory's
/// subdirectories are created lazily on first use).
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StateError> {
    let parent = path.parent().ok_or_else(|| {
        StateError::Malformed { path: path.to_path_buf(), reason: "path has no parent directory".to_string() }
    })?;
    std::fs::create_dir_all(parent).map_err(|e| StateError::io("create directory", parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StateError::io("create temp file", parent, e))?;
    tmp.write_all(contents).map_err(|e| StateError::io("write", path, e))?;
    tmp.flush().map_err(|e| StateError::io("flush", path, e))?;
    tmp.as_file().sync_all().map_err(|e| StateError::io("fsync", path, e))?;
    tmp.persist(path).map_err(|e| StateError::io("rename into place", path, e.error))?;
    Ok(())
}

/// Append `line` (plus a trailing newline) to `path`, creating it if absent.
/// Used for `output.jsonl`, which is append-only rather than atomic-replace:
/// losing the last unflushed line on crash is acceptable (§8 "Boundary
/// behaviours"), unlike the replace-style state files.
pub fn append_line(path: &Path, line: &str) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StateError::io("create directory", parent, e))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StateError::io("open for append", path, e))?;
    writeln!(file, "{line}").map_err(|e| StateError::io("append", path, e))?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
