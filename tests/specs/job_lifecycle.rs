use crate::prelude::{fixture, wait_until_idle};
use herdctl_core::{AgentStatus, JobStatus};
use herdctl_fleet::TriggerOptions;
use herdctl_runtime::ScriptedRun;

const CONFIG: &str = r#"
agents:
  scout:
    model: "claude-sonnet"
    working_directory: "/tmp"
    max_concurrent: 2
"#;

/// A triggered job runs against the real state directory: the job file,
/// its output records, and the agent's persisted status all land on disk
/// exactly as the in-memory API reports them.
#[tokio::test]
async fn triggered_job_persists_job_and_output_to_disk() {
    let fx = fixture(CONFIG);
    fx.manager.start().unwrap();
    fx.runtime.push(ScriptedRun::output("patrol complete"));

    let outcome = fx.manager.trigger("scout", None, TriggerOptions::default()).unwrap();
    wait_until_idle(&fx.manager, "scout").await;

    let storage = herdctl_storage::StateLayer::new(fx.state_dir.clone());
    let job = storage.read_job(&outcome.job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.agent, "scout");

    let output = storage.read_output(&outcome.job_id).unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].content.as_deref(), Some("patrol complete"));

    let status = fx.manager.get_fleet_status().unwrap();
    let scout = &status.agents["scout"];
    assert_eq!(scout.status, AgentStatus::Idle);
    assert_eq!(scout.last_job, Some(outcome.job_id));
}

/// A runtime failure marks the job failed and carries the failure reason
/// into the persisted job record, rather than silently completing.
#[tokio::test]
async fn failing_runtime_marks_job_failed_with_reason() {
    let fx = fixture(CONFIG);
    fx.manager.start().unwrap();
    fx.runtime.push(ScriptedRun::failing("model unavailable"));

    let outcome = fx.manager.trigger("scout", None, TriggerOptions::default()).unwrap();
    wait_until_idle(&fx.manager, "scout").await;

    let storage = herdctl_storage::StateLayer::new(fx.state_dir.clone());
    let job = storage.read_job(&outcome.job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("model unavailable"));

    let status = fx.manager.get_fleet_status().unwrap();
    assert_eq!(status.agents["scout"].error_message.as_deref(), Some("model unavailable"));
}

/// Triggering with a `prompt` override takes precedence over the agent's
/// configured default, and the override is what actually reaches the
/// runtime's execute request.
#[tokio::test]
async fn trigger_prompt_override_reaches_the_runtime() {
    let fx = fixture(CONFIG);
    fx.manager.start().unwrap();
    fx.runtime.push(ScriptedRun::output("ack"));

    fx.manager
        .trigger("scout", None, TriggerOptions { prompt: Some("check the perimeter".to_string()), ..Default::default() })
        .unwrap();
    wait_until_idle(&fx.manager, "scout").await;

    let requests = fx.runtime.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt.as_deref(), Some("check the perimeter"));
}
