// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Executor: drives one [`RuntimeJob`] to completion, persisting
//! output and computing the job's final status (§2 "Job Executor (per job)").
//!
//! Queue/scheduler bookkeeping and terminal-event emission are *not* this
//! module's job — they belong to the Fleet Manager, which owns the cross-job
//! coordination the executor has no business knowing about. This keeps the
//! executor a pure function of (job, runtime, clock) plus an output sink.

use herdctl_core::{Clock, Event, EventBus, ExitReason, Job, JobStatus, OutputRecord, OutputRecordKind, ResolvedAgent, TerminationType};
use herdctl_runtime::{ExecuteRequest, Message, Runtime};
use herdctl_storage::StateLayer;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Sent to a running job's executor task to request termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobControl {
    CancelGraceful,
    CancelForced,
}

/// What the executor produced once its job reached a terminal status.
pub(crate) struct ExecutionOutcome {
    pub job: Job,
    /// `Some` iff a [`JobControl`] cancellation was ever received, and which
    /// kind was most recently requested — the job's status is forced to
    /// `cancelled` unconditionally whenever this is set (§5 "cancelJob").
    pub termination: Option<TerminationType>,
}

fn output_kind_label(kind: &OutputRecordKind) -> &'static str {
    match kind {
        OutputRecordKind::System => "system",
        OutputRecordKind::Assistant => "assistant",
        OutputRecordKind::User => "user",
        OutputRecordKind::Tool => "tool",
        OutputRecordKind::Error => "error",
    }
}

fn build_request(agent: &ResolvedAgent, job: &Job) -> ExecuteRequest {
    ExecuteRequest {
        agent: job.agent.clone(),
        model: agent.model.clone(),
        prompt: job.prompt.clone(),
        session_id: job.session_id.clone(),
        working_directory: agent.working_directory.clone(),
        permission_mode: agent.permission_mode.clone(),
        max_turns: agent.max_turns,
        system_prompt: agent.system_prompt.clone(),
    }
}

fn finalize<C: Clock>(
    job: &mut Job,
    status: JobStatus,
    exit_reason: ExitReason,
    error_message: Option<String>,
    termination: Option<TerminationType>,
    clock: &C,
) {
    let now = clock.epoch_ms();
    if termination.is_some() {
        // Cancellation was requested: the job transitions through
        // `cancelled` unconditionally, regardless of what the runtime
        // itself last reported (§5 "Cancellation & timeouts").
        job.finish(JobStatus::Cancelled, ExitReason::Cancelled, now);
        job.error_message = None;
    } else {
        job.finish(status, exit_reason, now);
        job.error_message = error_message;
    }
}

/// Drive `job` to completion against `runtime`, persisting output records and
/// the final job metadata. Returns once the job reaches a terminal status.
pub(crate) async fn run_job<C: Clock>(
    mut job: Job,
    agent: ResolvedAgent,
    clock: C,
    runtime: Arc<dyn Runtime>,
    state: Arc<StateLayer>,
    events: EventBus,
    mut control_rx: mpsc::UnboundedReceiver<JobControl>,
    done_tx: watch::Sender<bool>,
) -> ExecutionOutcome {
    let request = build_request(&agent, &job);

    let mut runtime_job = match runtime.execute(request).await {
        Ok(runtime_job) => runtime_job,
        Err(err) => {
            finalize(&mut job, JobStatus::Failed, ExitReason::Error, Some(err.to_string()), None, &clock);
            if let Err(err) = state.write_job(&job) {
                tracing::warn!(job_id = %job.id, error = %err, "failed to persist job that failed to start");
            }
            let _ = done_tx.send(true);
            return ExecutionOutcome { job, termination: None };
        }
    };

    let mut termination: Option<TerminationType> = None;

    loop {
        tokio::select! {
            biased;
            control = control_rx.recv() => {
                match control {
                    Some(JobControl::CancelGraceful) => {
                        termination = Some(TerminationType::Graceful);
                        runtime_job.cancel_graceful().await;
                    }
                    Some(JobControl::CancelForced) => {
                        termination = Some(TerminationType::Forced);
                        runtime_job.cancel_forced().await;
                    }
                    None => {}
                }
            }
            message = runtime_job.next() => {
                match message {
                    Some(Message::Output { kind, content }) => {
                        let record = OutputRecord { kind: kind.clone(), content: content.clone(), timestamp: clock.epoch_ms() };
                        if let Err(err) = state.append_output(&job.id, &record) {
                            tracing::warn!(job_id = %job.id, error = %err, "failed to persist job output");
                        }
                        events.emit(Event::JobOutput {
                            job_id: job.id.clone(),
                            content,
                            record_type: output_kind_label(&kind).to_string(),
                        });
                    }
                    Some(Message::Done) => {
                        finalize(&mut job, JobStatus::Completed, ExitReason::Success, None, termination, &clock);
                        break;
                    }
                    Some(Message::Failed { reason }) => {
                        finalize(&mut job, JobStatus::Failed, ExitReason::Error, Some(reason), termination, &clock);
                        break;
                    }
                    None => {
                        finalize(
                            &mut job,
                            JobStatus::Failed,
                            ExitReason::Error,
                            Some("runtime stream ended without a terminal message".to_string()),
                            termination,
                            &clock,
                        );
                        break;
                    }
                }
            }
        }
    }

    if let Err(err) = state.write_job(&job) {
        tracing::warn!(job_id = %job.id, error = %err, "failed to persist finished job");
    }
    let _ = done_tx.send(true);
    ExecutionOutcome { job, termination }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
