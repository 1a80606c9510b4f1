// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::contract::{ExecuteRequest, Message};
use herdctl_core::PermissionMode;

fn shell_request(cwd: &std::path::Path, script: &str) -> (ProcessRuntime, ExecuteRequest) {
    let runtime = ProcessRuntime::new("/bin/sh").with_extra_args(vec!["-c".into(), script.into()]);
    let request = ExecuteRequest {
        agent: "scout".to_string(),
        model: "sh".to_string(),
        prompt: None,
        session_id: None,
        working_directory: cwd.to_path_buf(),
        permission_mode: PermissionMode::from("default"),
        max_turns: None,
        system_prompt: None,
    };
    (runtime, request)
}

#[tokio::test]
async fn streams_output_then_done_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let (runtime, request) =
        shell_request(dir.path(), r#"printf '{"type":"system","content":"booting"}\n{"type":"assistant","content":"hi"}\n'"#);

    let mut job = runtime.execute(request).await.unwrap();
    let first = job.next().await.unwrap();
    assert_eq!(first, Message::Output { kind: herdctl_core::OutputRecordKind::System, content: Some("booting".to_string()) });
    let second = job.next().await.unwrap();
    assert_eq!(second, Message::Output { kind: herdctl_core::OutputRecordKind::Assistant, content: Some("hi".to_string()) });
    assert_eq!(job.next().await, Some(Message::Done));
    assert_eq!(job.next().await, None);
}

#[tokio::test]
async fn nonzero_exit_yields_failed() {
    let dir = tempfile::tempdir().unwrap();
    let (runtime, request) = shell_request(dir.path(), r#"printf '{"type":"error","content":"boom"}\n'; exit 7"#);

    let mut job = runtime.execute(request).await.unwrap();
    assert_eq!(
        job.next().await.unwrap(),
        Message::Output { kind: herdctl_core::OutputRecordKind::Error, content: Some("boom".to_string()) }
    );
    match job.next().await {
        Some(Message::Failed { reason }) => assert!(reason.contains("exited with")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_lines_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (runtime, request) = shell_request(dir.path(), r#"printf 'not json\n{"type":"assistant","content":"ok"}\n'"#);

    let mut job = runtime.execute(request).await.unwrap();
    assert_eq!(
        job.next().await.unwrap(),
        Message::Output { kind: herdctl_core::OutputRecordKind::Assistant, content: Some("ok".to_string()) }
    );
    assert_eq!(job.next().await, Some(Message::Done));
}

#[tokio::test]
async fn missing_working_directory_is_rejected_before_spawn() {
    let (runtime, mut request) = shell_request(std::path::Path::new("/nonexistent"), "true");
    request.working_directory = std::path::PathBuf::from("/nonexistent/definitely-not-here");

    let err = runtime.execute(request).await.unwrap_err();
    assert!(matches!(err, RuntimeError::WorkingDirectoryMissing(_)));
}

#[tokio::test]
async fn forced_cancel_kills_a_long_running_process_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let (runtime, request) = shell_request(dir.path(), "sleep 30");

    let mut job = runtime.execute(request).await.unwrap();
    job.cancel_forced().await;

    let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), job.next()).await;
    assert!(outcome.is_ok(), "process should exit promptly after a forced kill");
    match outcome.unwrap() {
        Some(Message::Failed { .. }) | Some(Message::Done) => {}
        other => panic!("expected a terminal message, got {other:?}"),
    }
}
