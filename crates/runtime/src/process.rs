// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed [`Runtime`] adapter.
//!
//! Spawns the agent's model binary as a child process, writes the prompt to
//! its stdin, and parses newline-delimited JSON objects `{type, content?}`
//! from stdout as [`Message::Output`]. The final `Done`/`Failed` signal comes
//! from the process's exit status, not from a wire message — mirroring the
//! reaper-task pattern used for coop sidecar processes.

use crate::contract::{ExecuteRequest, Message, Runtime, RuntimeJob};
use crate::error::RuntimeError;
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// Spawns the configured executable for every request. In production this
/// points at the real agent CLI binary; tests substitute `FakeRuntime`
/// instead of pointing this at a script.
pub struct ProcessRuntime {
    executable: OsString,
    extra_args: Vec<OsString>,
}

impl ProcessRuntime {
    pub fn new(executable: impl Into<OsString>) -> Self {
        Self { executable: executable.into(), extra_args: Vec::new() }
    }

    /// Additional fixed arguments inserted before the per-request ones
    /// (e.g. `--output-format stream-json` already implied by a wrapper script).
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = OsString>) -> Self {
        self.extra_args = args.into_iter().collect();
        self
    }
}

#[async_trait]
impl Runtime for ProcessRuntime {
    async fn execute(&self, request: ExecuteRequest) -> Result<Box<dyn RuntimeJob>, RuntimeError> {
        if !request.working_directory.is_dir() {
            return Err(RuntimeError::WorkingDirectoryMissing(request.working_directory));
        }

        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.extra_args)
            .arg("--model")
            .arg(&request.model)
            .arg("--permission-mode")
            .arg(&request.permission_mode.0)
            .current_dir(&request.working_directory)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(max_turns) = request.max_turns {
            cmd.arg("--max-turns").arg(max_turns.to_string());
        }
        if let Some(session_id) = &request.session_id {
            cmd.arg("--resume").arg(session_id);
        }
        if let Some(system_prompt) = &request.system_prompt {
            cmd.arg("--append-system-prompt").arg(system_prompt);
        }

        let mut child =
            cmd.spawn().map_err(|err| RuntimeError::SpawnFailed(format!("{}: {err}", format_program(&self.executable))))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(prompt) = &request.prompt {
                stdin.write_all(prompt.as_bytes()).await?;
            }
            stdin.shutdown().await?;
        }

        let stdout = child.stdout.take().ok_or_else(|| RuntimeError::SpawnFailed("no stdout pipe".into()))?;
        let stderr = child.stderr.take();

        tracing::debug!(agent = %request.agent, executable = %format_program(&self.executable), "agent process spawned");

        Ok(Box::new(ProcessJob { child, stdout: BufReader::new(stdout).lines(), stderr, finished: false }))
    }
}

fn format_program(program: &std::ffi::OsStr) -> String {
    program.to_string_lossy().into_owned()
}

#[derive(Deserialize)]
struct WireLine {
    #[serde(rename = "type")]
    kind: herdctl_core::OutputRecordKind,
    #[serde(default)]
    content: Option<String>,
}

pub struct ProcessJob {
    child: Child,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr: Option<ChildStderr>,
    finished: bool,
}

impl ProcessJob {
    async fn await_exit(&mut self) -> Message {
        match self.child.wait().await {
            Ok(status) if status.success() => Message::Done,
            Ok(status) => Message::Failed { reason: format!("exited with {status}: {}", self.drain_stderr().await) },
            Err(err) => Message::Failed { reason: err.to_string() },
        }
    }

    async fn drain_stderr(&mut self) -> String {
        let Some(mut stderr) = self.stderr.take() else {
            return String::new();
        };
        let mut buf = String::new();
        use tokio::io::AsyncReadExt;
        let _ = stderr.read_to_string(&mut buf).await;
        buf.trim().to_string()
    }
}

#[async_trait]
impl RuntimeJob for ProcessJob {
    async fn next(&mut self) -> Option<Message> {
        if self.finished {
            return None;
        }
        loop {
            match self.stdout.next_line().await {
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<WireLine>(trimmed) {
                        Ok(wire) => return Some(Message::Output { kind: wire.kind, content: wire.content }),
                        Err(err) => {
                            tracing::warn!(line = %trimmed, error = %err, "ignoring unparseable agent output line");
                            continue;
                        }
                    }
                }
                Ok(None) => {
                    self.finished = true;
                    return Some(self.await_exit().await);
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Message::Failed { reason: err.to_string() });
                }
            }
        }
    }

    async fn cancel_graceful(&mut self) {
        if let Some(id) = self.child.id() {
            send_sigterm(id);
        } else {
            let _ = self.child.start_kill();
        }
    }

    async fn cancel_forced(&mut self) {
        let _ = self.child.start_kill();
    }
}

#[cfg(unix)]
fn send_sigterm(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) {}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
