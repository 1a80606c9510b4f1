// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `herdctld` side of the control socket: accepts connections from
//! `herdctl` and dispatches each [`crate::protocol::Request`] onto a
//! [`FleetManager`]. One task per connection; the manager itself is the
//! only thing shared, via its `Arc`-backed clone (§4.1).

use crate::protocol::{Request, Response};
use crate::wire::{read_message, write_message, WireError};
use herdctl_core::{Clock, JobId, TerminationType};
use herdctl_fleet::{FleetError, FleetManager, ForkOptions, StopOptions, TriggerOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::{UnixListener, UnixStream};

/// Bind the control socket and serve connections until `shutdown` resolves.
///
/// Removes a stale socket file left behind by an unclean prior shutdown
/// before binding — `herdctld` is the sole owner of the state directory
/// (§3 "Ownership"), so a leftover socket from a dead daemon is safe to
/// reclaim.
pub async fn serve<C: Clock>(
    manager: FleetManager<C>,
    config_path: PathBuf,
    socket_path: &Path,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> std::io::Result<()> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    tracing::info!(path = %socket_path.display(), "control socket listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted?;
                let manager = manager.clone();
                let config_path = config_path.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(manager, config_path, stream).await {
                        tracing::warn!(error = %err, "control connection ended with an error");
                    }
                });
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    let _ = std::fs::remove_file(socket_path);
    Ok(())
}

async fn handle_connection<C: Clock>(
    manager: FleetManager<C>,
    config_path: PathBuf,
    mut stream: UnixStream,
) -> Result<(), WireError> {
    let request: Request = read_message(&mut stream).await?;
    match request {
        Request::Ping => write_message(&mut stream, &Response::Pong).await,
        Request::Status => {
            let resp = match manager.get_fleet_status() {
                Ok(status) => Response::Status { status },
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::AgentInfo { agent } => {
            let resp = match manager.get_agent_info(&agent) {
                Ok(agent) => Response::AgentInfo { agent },
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::Schedules { agent } => {
            let resp = match manager.get_schedules(&agent) {
                Ok(schedules) => Response::Schedules { schedules },
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::Trigger { agent, schedule, prompt, bypass_concurrency_limit } => {
            let opts = TriggerOptions { prompt, bypass_concurrency_limit };
            let resp = match manager.trigger(&agent, schedule.as_deref(), opts) {
                Ok(outcome) => Response::Triggered { outcome },
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::CancelJob { job_id, timeout_ms } => {
            let resp = match manager.cancel_job(&job_id, timeout_ms.map(Duration::from_millis)).await {
                Ok(termination) => Response::Cancelled { termination_type: termination_label(termination) },
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::ForkJob { job_id, prompt, schedule } => {
            let resp = match manager.fork_job(&job_id, ForkOptions { prompt, schedule }) {
                Ok(outcome) => Response::Forked { outcome },
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::EnableSchedule { agent, schedule } => {
            let resp = match manager.enable_schedule(&agent, &schedule) {
                Ok(_) => Response::Ok,
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::DisableSchedule { agent, schedule } => {
            let resp = match manager.disable_schedule(&agent, &schedule) {
                Ok(_) => Response::Ok,
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
        Request::Reload => {
            let resp = match reload_from_disk(&manager, &config_path) {
                Ok(_) => Response::Ok,
                Err(message) => Response::Error { message },
            };
            write_message(&mut stream, &resp).await
        }
        Request::StreamJobOutput { job_id, history_limit } => {
            stream_job_output(&manager, &mut stream, job_id, history_limit).await
        }
        Request::Stop { timeout_ms, wait_for_jobs, cancel_on_timeout } => {
            let opts = StopOptions {
                timeout: timeout_ms.map(Duration::from_millis).unwrap_or(Duration::from_secs(10)),
                wait_for_jobs,
                cancel_on_timeout,
            };
            let resp = match manager.stop(opts).await {
                Ok(_) => Response::Ok,
                Err(err) => error_response(&err),
            };
            write_message(&mut stream, &resp).await
        }
    }
}

/// Re-reads the config path the daemon was started with and applies it via
/// `reload()`. The daemon, not the CLI, owns the config path (§4.1 "reload
/// contract") — the CLI only asks for a reload to happen; on validation
/// failure the prior configuration stays in effect and the original error
/// is surfaced, unmodified, to the caller.
fn reload_from_disk<C: Clock>(manager: &FleetManager<C>, config_path: &Path) -> Result<(), String> {
    let new_config = herdctl_config::load(config_path).map_err(|err| err.to_string())?;
    manager.reload(new_config).map(|_| ()).map_err(|err| err.to_string())
}

async fn stream_job_output<C: Clock>(
    manager: &FleetManager<C>,
    stream: &mut UnixStream,
    job_id: JobId,
    history_limit: Option<usize>,
) -> Result<(), WireError> {
    let mut cursor = match manager.stream_job_output(&job_id, history_limit) {
        Ok(cursor) => cursor,
        Err(err) => return write_message(stream, &error_response(&err)).await,
    };
    while let Some(record) = cursor.next().await {
        write_message(stream, &Response::JobOutputLine { record }).await?;
    }
    write_message(stream, &Response::JobOutputDone).await
}

fn termination_label(termination: TerminationType) -> String {
    termination.to_string()
}

fn error_response(err: &FleetError) -> Response {
    Response::Error { message: err.to_string() }
}
