// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn write_atomic_creates_parent_dirs_and_writes_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("state.yaml");

    write_atomic(&path, b"fleet: {}\n").expect("write");

    assert_eq!(std::fs::read(&path).expect("read back"), b"fleet: {}\n");
}

#[test]
fn write_atomic_replaces_existing_file_wholesale() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.yaml");

    write_atomic(&path, b"first\n").expect("write first");
    write_atomic(&path, b"second\n").expect("write second");

    assert_eq!(std::fs::read(&path).expect("read back"), b"second\n");
}

#[test]
fn append_line_creates_file_and_appends_across_calls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("output.jsonl");

    append_line(&path, "{\"a\":1}").expect("append 1");
    append_line(&path, "{\"a\":2}").expect("append 2");

    let contents = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(contents, "{\"a\":1}\n{\"a\":2}\n");
}
