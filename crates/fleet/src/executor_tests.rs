use super::*;
use herdctl_core::{AgentBuilder, FakeClock, JobBuilder};
use herdctl_runtime::{FakeRuntime, ScriptedRun};
use std::time::Duration;
use tempfile::tempdir;

fn agent() -> herdctl_core::ResolvedAgent {
    AgentBuilder::default().name("scout").build()
}

async fn run(job: Job, runtime: FakeRuntime, clock: FakeClock) -> (ExecutionOutcome, Arc<StateLayer>) {
    let dir = tempdir().unwrap();
    let state = Arc::new(StateLayer::new(dir.path()));
    state.initialize().unwrap();
    let events = EventBus::new();
    let (_control_tx, control_rx) = mpsc::unbounded_channel();
    let (done_tx, _done_rx) = watch::channel(false);
    let outcome =
        run_job(job, agent(), clock, Arc::new(runtime) as Arc<dyn Runtime>, state.clone(), events, control_rx, done_tx)
            .await;
    (outcome, state)
}

#[tokio::test]
async fn completes_successfully_and_persists_output() {
    let runtime = FakeRuntime::new();
    runtime.push(ScriptedRun::output("hello"));
    let job = JobBuilder::default().agent("scout").build();
    let (outcome, state) = run(job.clone(), runtime, FakeClock::default()).await;

    assert_eq!(outcome.job.status, JobStatus::Completed);
    assert_eq!(outcome.job.exit_reason, Some(ExitReason::Success));
    assert!(outcome.termination.is_none());

    let output = state.read_output(&job.id).unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].content.as_deref(), Some("hello"));

    let persisted = state.read_job(&job.id).unwrap();
    assert_eq!(persisted.status, JobStatus::Completed);
}

#[tokio::test]
async fn failure_preserves_reason() {
    let runtime = FakeRuntime::new();
    runtime.push(ScriptedRun::failing("agent process exited with code 1"));
    let job = JobBuilder::default().agent("scout").build();
    let (outcome, _state) = run(job, runtime, FakeClock::default()).await;

    assert_eq!(outcome.job.status, JobStatus::Failed);
    assert_eq!(outcome.job.exit_reason, Some(ExitReason::Error));
    assert_eq!(outcome.job.error_message.as_deref(), Some("agent process exited with code 1"));
}

#[tokio::test]
async fn spawn_failure_finishes_as_failed_without_termination() {
    let runtime = FakeRuntime::new();
    let job = JobBuilder::default().agent("scout").build();
    let (outcome, _state) = run(job, runtime, FakeClock::default()).await;

    assert_eq!(outcome.job.status, JobStatus::Failed);
    assert!(outcome.termination.is_none());
}

#[tokio::test]
async fn graceful_cancel_forces_cancelled_status() {
    let runtime = FakeRuntime::new();
    runtime.push(ScriptedRun {
        messages: vec![Message::Output { kind: herdctl_core::OutputRecordKind::Assistant, content: Some("working".into()) }],
        ignore_graceful_cancel: false,
    });
    let job = JobBuilder::default().agent("scout").build();

    let dir = tempdir().unwrap();
    let state = Arc::new(StateLayer::new(dir.path()));
    state.initialize().unwrap();
    let events = EventBus::new();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let (done_tx, _done_rx) = watch::channel(false);

    control_tx.send(JobControl::CancelGraceful).unwrap();
    let outcome = run_job(
        job,
        agent(),
        FakeClock::default(),
        Arc::new(runtime) as Arc<dyn Runtime>,
        state,
        events,
        control_rx,
        done_tx,
    )
    .await;

    assert_eq!(outcome.job.status, JobStatus::Cancelled);
    assert_eq!(outcome.job.exit_reason, Some(ExitReason::Cancelled));
    assert_eq!(outcome.termination, Some(TerminationType::Graceful));
    assert!(outcome.job.error_message.is_none());
}

#[tokio::test]
async fn forced_cancel_wins_over_an_uncooperative_runtime() {
    let runtime = FakeRuntime::new();
    runtime.push(ScriptedRun {
        messages: vec![Message::Output { kind: herdctl_core::OutputRecordKind::Assistant, content: Some("stuck".into()) }],
        ignore_graceful_cancel: true,
    });
    let job = JobBuilder::default().agent("scout").build();

    let dir = tempdir().unwrap();
    let state = Arc::new(StateLayer::new(dir.path()));
    state.initialize().unwrap();
    let events = EventBus::new();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let (done_tx, _done_rx) = watch::channel(false);

    control_tx.send(JobControl::CancelGraceful).unwrap();
    control_tx.send(JobControl::CancelForced).unwrap();
    let outcome = run_job(
        job,
        agent(),
        FakeClock::default(),
        Arc::new(runtime) as Arc<dyn Runtime>,
        state,
        events,
        control_rx,
        done_tx,
    )
    .await;

    assert_eq!(outcome.job.status, JobStatus::Cancelled);
    assert_eq!(outcome.termination, Some(TerminationType::Forced));
}

#[tokio::test]
async fn done_tx_signals_completion() {
    let runtime = FakeRuntime::new();
    runtime.push(ScriptedRun::output("hi"));
    let job = JobBuilder::default().agent("scout").build();

    let dir = tempdir().unwrap();
    let state = Arc::new(StateLayer::new(dir.path()));
    state.initialize().unwrap();
    let events = EventBus::new();
    let (_control_tx, control_rx) = mpsc::unbounded_channel();
    let (done_tx, mut done_rx) = watch::channel(false);

    run_job(job, agent(), FakeClock::default(), Arc::new(runtime) as Arc<dyn Runtime>, state, events, control_rx, done_tx)
        .await;

    tokio::time::timeout(Duration::from_millis(100), done_rx.changed()).await.unwrap().unwrap();
    assert!(*done_rx.borrow());
}
