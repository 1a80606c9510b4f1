// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy, cancellable log streaming (§4.1 "streamLogs / streamJobOutput /
//! streamAgentLogs", §9 "Lazy sequences for log streaming").
//!
//! Modeled as a cancellable pull interface rather than the source's
//! iterable-coroutine pattern (§9): [`JobOutputCursor::next`] is polled by
//! the caller, who owns backpressure. Replay of persisted output happens
//! once, up front; once the backlog (bounded by `history_limit`) is
//! drained, the cursor polls the output file for newly appended records at
//! a fixed 1-second cadence — the freshness target §9's Open Question asked
//! to have pinned down explicitly (§9 "Supplement" #3), matching the
//! scheduler's own tick granularity.

use herdctl_core::{JobId, OutputRecord};
use herdctl_storage::StateLayer;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A lazy, cancellable sequence of a job's output records (§4.1).
///
/// For a terminated job, the stream ends once the persisted backlog (or the
/// last `history_limit` records of it) has been replayed. For a live job, it
/// keeps polling until the job reaches a terminal status, then yields any
/// final records and ends.
pub struct JobOutputCursor {
    state: Arc<StateLayer>,
    job_id: JobId,
    backlog: std::collections::VecDeque<OutputRecord>,
    emitted: usize,
    replayed: bool,
}

impl JobOutputCursor {
    pub(crate) fn new(state: Arc<StateLayer>, job_id: JobId, history_limit: usize) -> Self {
        let mut backlog = state.read_output(&job_id).unwrap_or_default();
        if backlog.len() > history_limit {
            backlog.drain(0..backlog.len() - history_limit);
        }
        let emitted = backlog.len();
        Self { state, job_id, backlog: backlog.into(), emitted, replayed: false }
    }

    /// Pull the next record, blocking (via polling) until one is available
    /// or the stream has definitively ended. Returns `None` once the job is
    /// terminal and every record it produced has been yielded.
    pub async fn next(&mut self) -> Option<OutputRecord> {
        loop {
            if let Some(record) = self.backlog.pop_front() {
                return Some(record);
            }
            self.replayed = true;

            let job_terminal = self
                .state
                .try_read_job(&self.job_id)
                .ok()
                .flatten()
                .map(|job| job.status.is_terminal())
                .unwrap_or(true);

            let all = self.state.read_output(&self.job_id).unwrap_or_default();
            if all.len() > self.emitted {
                self.backlog.extend(all[self.emitted..].iter().cloned());
                self.emitted = all.len();
                continue;
            }

            if job_terminal {
                return None;
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Whether the initial persisted replay has been fully drained at least once.
    pub fn has_replayed(&self) -> bool {
        self.replayed
    }
}

/// One entry in a [`crate::manager::FleetManager::stream_logs`]-style feed
/// (§4.1 `LogEntry{timestamp, level, source, agentName?, jobId?,
/// scheduleName?, message, data?}`).
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: u64,
    pub level: LogLevel,
    pub source: String,
    pub agent_name: Option<String>,
    pub job_id: Option<JobId>,
    pub schedule_name: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

herdctl_core::simple_display! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

/// Build a [`LogEntry`] from one job output record, the shape `streamJobOutput`
/// and `streamAgentLogs` both ultimately render (§4.1).
pub fn log_entry_from_output(agent: &str, job_id: &JobId, record: &OutputRecord) -> LogEntry {
    let level = match record.kind {
        herdctl_core::OutputRecordKind::Error => LogLevel::Error,
        _ => LogLevel::Info,
    };
    LogEntry {
        timestamp: record.timestamp,
        level,
        source: "job".to_string(),
        agent_name: Some(agent.to_string()),
        job_id: Some(job_id.clone()),
        schedule_name: None,
        message: record.content.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "log_stream_tests.rs"]
mod tests;
