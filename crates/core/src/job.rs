// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job: the record of one execution of an agent (§3 "Job").

use crate::id::JobId;
use serde::{Deserialize, Serialize};

/// What caused a job to be created (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Schedule,
    Manual,
    Fork,
    Chat,
    Webhook,
}

crate::simple_display! {
    TriggerType {
        Schedule => "schedule",
        Manual => "manual",
        Fork => "fork",
        Chat => "chat",
        Webhook => "webhook",
    }
}

/// Current lifecycle status of a job (§3 "Lifecycle": created → running →
/// terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    /// Terminal states are absorbing (§8 invariant 3): once completed,
    /// failed, or cancelled, a job never transitions again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// Why a job reached its terminal state (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Success,
    Error,
    Cancelled,
    Timeout,
}

crate::simple_display! {
    ExitReason {
        Success => "success",
        Error => "error",
        Cancelled => "cancelled",
        Timeout => "timeout",
    }
}

/// One execution of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub agent: String,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub forked_from: Option<JobId>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub started_at: u64,
    #[serde(default)]
    pub finished_at: Option<u64>,
    pub status: JobStatus,
    #[serde(default)]
    pub exit_reason: Option<ExitReason>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Job {
    /// Transition to a terminal state. No-op (and logged by the caller as a
    /// bug) if the job is already terminal — terminal state is absorbing.
    pub fn finish(&mut self, status: JobStatus, exit_reason: ExitReason, finished_at: u64) {
        debug_assert!(status.is_terminal(), "finish() requires a terminal status");
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.exit_reason = Some(exit_reason);
        self.finished_at = Some(finished_at);
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            agent: String = "scout",
        }
        set {
            id: JobId = JobId::new(1_700_000_000_000),
            trigger_type: TriggerType = TriggerType::Manual,
            schedule: Option<String> = None,
            prompt: Option<String> = None,
            forked_from: Option<JobId> = None,
            session_id: Option<String> = None,
            started_at: u64 = 1_700_000_000_000,
            finished_at: Option<u64> = None,
            status: JobStatus = JobStatus::Pending,
            exit_reason: Option<ExitReason> = None,
            error_message: Option<String> = None,
        }
    }
}

/// One line of a job's recorded output (§3 "Job Output Record").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRecordKind {
    System,
    Assistant,
    User,
    Tool,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    #[serde(rename = "type")]
    pub kind: OutputRecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub timestamp: u64,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
