// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn unsafe_path_message_names_the_escaping_component() {
    let err = StateError::UnsafePath {
        state_dir: PathBuf::from("/var/herdctl"),
        attempted: PathBuf::from("/var/herdctl/../etc/passwd"),
        component: "..".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains(".."));
    assert!(message.contains("/var/herdctl"));
}

#[test]
fn io_error_message_names_operation_and_path() {
    let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err = StateError::io("read", PathBuf::from("/var/herdctl/state.yaml"), source);
    let message = err.to_string();
    assert!(message.contains("read"));
    assert!(message.contains("state.yaml"));
}
