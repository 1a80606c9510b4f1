use super::*;
use herdctl_core::{JobBuilder, JobStatus, OutputRecordKind};
use tempfile::tempdir;

fn state() -> (tempfile::TempDir, Arc<StateLayer>) {
    let dir = tempdir().unwrap();
    let state = Arc::new(StateLayer::new(dir.path()));
    state.initialize().unwrap();
    (dir, state)
}

fn record(content: &str, ts: u64) -> OutputRecord {
    OutputRecord { kind: OutputRecordKind::Assistant, content: Some(content.to_string()), timestamp: ts }
}

#[tokio::test]
async fn replays_persisted_output_then_ends_for_a_terminal_job() {
    let (_dir, state) = state();
    let mut job = JobBuilder::default().agent("scout").build();
    job.status = JobStatus::Completed;
    job.exit_reason = Some(herdctl_core::ExitReason::Success);
    job.finished_at = Some(1_700_000_001_000);
    state.write_job(&job).unwrap();
    state.append_output(&job.id, &record("hello", 1)).unwrap();
    state.append_output(&job.id, &record("world", 2)).unwrap();

    let mut cursor = JobOutputCursor::new(state, job.id.clone(), 1000);
    assert_eq!(cursor.next().await.unwrap().content.as_deref(), Some("hello"));
    assert_eq!(cursor.next().await.unwrap().content.as_deref(), Some("world"));
    assert!(cursor.next().await.is_none());
}

#[tokio::test]
async fn truncates_backlog_to_history_limit() {
    let (_dir, state) = state();
    let job = JobBuilder::default().agent("scout").build();
    let mut completed = job.clone();
    completed.status = JobStatus::Completed;
    completed.exit_reason = Some(herdctl_core::ExitReason::Success);
    state.write_job(&completed).unwrap();
    for i in 0..5 {
        state.append_output(&job.id, &record(&format!("line-{i}"), i as u64)).unwrap();
    }

    let mut cursor = JobOutputCursor::new(state, job.id.clone(), 2);
    let first = cursor.next().await.unwrap();
    let second = cursor.next().await.unwrap();
    assert_eq!(first.content.as_deref(), Some("line-3"));
    assert_eq!(second.content.as_deref(), Some("line-4"));
    assert!(cursor.next().await.is_none());
}

#[tokio::test]
async fn picks_up_output_appended_after_replay_for_a_live_job() {
    let (_dir, state) = state();
    let job = JobBuilder::default().agent("scout").build();
    state.write_job(&job).unwrap();
    state.append_output(&job.id, &record("first", 1)).unwrap();

    let mut cursor = JobOutputCursor::new(state.clone(), job.id.clone(), 1000);
    assert_eq!(cursor.next().await.unwrap().content.as_deref(), Some("first"));

    state.append_output(&job.id, &record("second", 2)).unwrap();
    let mut finished = job.clone();
    finished.status = JobStatus::Completed;
    finished.exit_reason = Some(herdctl_core::ExitReason::Success);
    state.write_job(&finished).unwrap();

    assert_eq!(cursor.next().await.unwrap().content.as_deref(), Some("second"));
    assert!(cursor.next().await.is_none());
}

#[test]
fn log_entry_maps_error_records_to_error_level() {
    let job_id = herdctl_core::JobId::new(1_700_000_000_000);
    let record = OutputRecord { kind: OutputRecordKind::Error, content: Some("boom".to_string()), timestamp: 5 };
    let entry = log_entry_from_output("scout", &job_id, &record);
    assert_eq!(entry.level, LogLevel::Error);
    assert_eq!(entry.message, "boom");
    assert_eq!(entry.agent_name.as_deref(), Some("scout"));
}
