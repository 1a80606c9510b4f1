// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `herdctl` side of the control socket: a thin request/response client
//! plus a `StreamJobOutput` reader, against the daemon's [`crate::server`].

use crate::protocol::{Request, Response};
use crate::wire::{read_message, write_message, WireError};
use herdctl_core::{JobId, OutputRecord};
use std::path::PathBuf;
use tokio::net::UnixStream;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not reach herdctld at {path:?} (hint: is the daemon running? `herdctld --state-dir {path:?}`): {source}")]
    Connect { path: PathBuf, #[source] source: std::io::Error },
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("daemon reported an error: {message}")]
    Daemon { message: String },
    #[error("daemon sent an unexpected response for this request")]
    UnexpectedResponse,
}

/// A connection to a running `herdctld`, one per request (the protocol is
/// request/response per connection, not a long-lived session).
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    async fn connect(&self) -> Result<UnixStream, ClientError> {
        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect { path: self.socket_path.clone(), source })
    }

    async fn call(&self, request: Request) -> Result<Response, ClientError> {
        let mut stream = self.connect().await?;
        write_message(&mut stream, &request).await?;
        let response: Response = read_message(&mut stream).await?;
        if let Response::Error { message } = response {
            return Err(ClientError::Daemon { message });
        }
        Ok(response)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.call(Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn status(&self) -> Result<herdctl_fleet::FleetStatus, ClientError> {
        match self.call(Request::Status).await? {
            Response::Status { status } => Ok(status),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn agent_info(&self, agent: &str) -> Result<herdctl_fleet::AgentInfo, ClientError> {
        match self.call(Request::AgentInfo { agent: agent.to_string() }).await? {
            Response::AgentInfo { agent } => Ok(agent),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn schedules(
        &self,
        agent: &str,
    ) -> Result<std::collections::HashMap<String, herdctl_core::ScheduleState>, ClientError> {
        match self.call(Request::Schedules { agent: agent.to_string() }).await? {
            Response::Schedules { schedules } => Ok(schedules),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn trigger(
        &self,
        agent: &str,
        schedule: Option<&str>,
        prompt: Option<String>,
        bypass_concurrency_limit: bool,
    ) -> Result<herdctl_fleet::TriggerOutcome, ClientError> {
        let req = Request::Trigger {
            agent: agent.to_string(),
            schedule: schedule.map(str::to_string),
            prompt,
            bypass_concurrency_limit,
        };
        match self.call(req).await? {
            Response::Triggered { outcome } => Ok(outcome),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn cancel_job(&self, job_id: &JobId, timeout_ms: Option<u64>) -> Result<String, ClientError> {
        let req = Request::CancelJob { job_id: job_id.clone(), timeout_ms };
        match self.call(req).await? {
            Response::Cancelled { termination_type } => Ok(termination_type),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn fork_job(
        &self,
        job_id: &JobId,
        prompt: Option<String>,
        schedule: Option<String>,
    ) -> Result<herdctl_fleet::TriggerOutcome, ClientError> {
        let req = Request::ForkJob { job_id: job_id.clone(), prompt, schedule };
        match self.call(req).await? {
            Response::Forked { outcome } => Ok(outcome),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn enable_schedule(&self, agent: &str, schedule: &str) -> Result<(), ClientError> {
        let req = Request::EnableSchedule { agent: agent.to_string(), schedule: schedule.to_string() };
        match self.call(req).await? {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn disable_schedule(&self, agent: &str, schedule: &str) -> Result<(), ClientError> {
        let req = Request::DisableSchedule { agent: agent.to_string(), schedule: schedule.to_string() };
        match self.call(req).await? {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn reload(&self) -> Result<(), ClientError> {
        match self.call(Request::Reload).await? {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn stop(&self, timeout_ms: Option<u64>, wait_for_jobs: bool, cancel_on_timeout: bool) -> Result<(), ClientError> {
        let req = Request::Stop { timeout_ms, wait_for_jobs, cancel_on_timeout };
        match self.call(req).await? {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Replay (and, for a still-running job, tail) a job's output records.
    /// Opens its own connection and drains it to `Response::JobOutputDone`,
    /// mirroring `streamJobOutput`'s lazy-pull contract (§4.1, §9) at the
    /// IPC boundary: the caller drives `next()`.
    pub async fn stream_job_output(
        &self,
        job_id: &JobId,
        history_limit: Option<usize>,
    ) -> Result<JobOutputStream, ClientError> {
        let mut stream = self.connect().await?;
        let req = Request::StreamJobOutput { job_id: job_id.clone(), history_limit };
        write_message(&mut stream, &req).await?;
        Ok(JobOutputStream { stream })
    }
}

/// Pull-based cursor over `Response::JobOutputLine` frames from one
/// `StreamJobOutput` connection.
pub struct JobOutputStream {
    stream: UnixStream,
}

impl JobOutputStream {
    pub async fn next(&mut self) -> Result<Option<OutputRecord>, ClientError> {
        match read_message(&mut self.stream).await? {
            Response::JobOutputLine { record } => Ok(Some(record)),
            Response::JobOutputDone => Ok(None),
            Response::Error { message } => Err(ClientError::Daemon { message }),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}
