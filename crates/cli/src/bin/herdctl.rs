// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `herdctl` — the control CLI. Talks to a running `herdctld` over the
//! per-state-directory control socket (§6.4); never touches the state
//! directory itself.

use clap::{Parser, Subcommand};
use herdctl_cli::client::DaemonClient;
use herdctl_cli::env::{default_state_dir, socket_path};
use herdctl_cli::output::{
    print_agent_info, print_fleet_status, print_output_record, print_schedules, print_trigger_outcome, OutputFormat,
};
use herdctl_cli::ExitError;
use herdctl_core::JobId;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "herdctl", version, styles = herdctl_cli::color::styles())]
struct Cli {
    /// State directory the target `herdctld` was started with (§6.4).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Output format for commands that print structured data.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print fleet-wide status (§4.1 `getFleetStatus`).
    Status,
    /// Print one agent's status (§4.1 `getAgentInfo`).
    Agent { name: String },
    /// Print one agent's schedules (§4.1 `getSchedules`).
    Schedules { agent: String },
    /// Manually trigger an agent (§4.1 `trigger`).
    Trigger {
        agent: String,
        /// Named schedule to trigger under (uses its prompt override).
        #[arg(long)]
        schedule: Option<String>,
        /// Prompt override; takes precedence over the schedule/agent default.
        #[arg(long)]
        prompt: Option<String>,
        /// Admit even if the agent or fleet is at its concurrency limit.
        #[arg(long)]
        bypass_concurrency_limit: bool,
    },
    /// Cancel a running job (§4.1 `cancelJob`).
    Cancel {
        job_id: String,
        /// Grace period before escalating to forced termination, in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Fork a new job from a prior one, inheriting its session (§4.1 `forkJob`).
    Fork {
        job_id: String,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        schedule: Option<String>,
    },
    /// Enable a disabled schedule (§4.1 `enableSchedule`).
    Enable { agent: String, schedule: String },
    /// Disable a schedule so the scheduler ignores it until re-enabled (§4.1 `disableSchedule`).
    Disable { agent: String, schedule: String },
    /// Reload the daemon's configuration from disk (§4.1 `reload`).
    Reload,
    /// Tail a job's output (§4.1 `streamJobOutput`).
    Logs {
        job_id: String,
        /// Number of persisted records to replay before tailing live output.
        #[arg(long, default_value_t = 1000)]
        history_limit: usize,
    },
    /// Ask the daemon to stop (§4.1 `stop`).
    Stop {
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Cancel in-flight jobs immediately instead of waiting for them.
        #[arg(long)]
        no_wait: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("herdctl: {err}");
        std::process::exit(err.code);
    }
}

async fn run() -> Result<(), ExitError> {
    let cli = Cli::parse();
    let state_dir = cli.state_dir.clone().unwrap_or_else(default_state_dir);
    let client = DaemonClient::new(socket_path(&state_dir));
    let format = cli.format;

    match cli.command {
        Command::Status => {
            let status = client.status().await.map_err(to_exit_error)?;
            print_fleet_status(&status, format);
        }
        Command::Agent { name } => {
            let info = client.agent_info(&name).await.map_err(to_exit_error)?;
            print_agent_info(&info, format);
        }
        Command::Schedules { agent } => {
            let schedules = client.schedules(&agent).await.map_err(to_exit_error)?;
            print_schedules(&schedules, format);
        }
        Command::Trigger { agent, schedule, prompt, bypass_concurrency_limit } => {
            let outcome = client
                .trigger(&agent, schedule.as_deref(), prompt, bypass_concurrency_limit)
                .await
                .map_err(to_exit_error)?;
            print_trigger_outcome(&outcome, format);
        }
        Command::Cancel { job_id, timeout_ms } => {
            let termination = client.cancel_job(&JobId::from_string(job_id), timeout_ms).await.map_err(to_exit_error)?;
            println!("terminated: {termination}");
        }
        Command::Fork { job_id, prompt, schedule } => {
            let outcome =
                client.fork_job(&JobId::from_string(job_id), prompt, schedule).await.map_err(to_exit_error)?;
            print_trigger_outcome(&outcome, format);
        }
        Command::Enable { agent, schedule } => {
            client.enable_schedule(&agent, &schedule).await.map_err(to_exit_error)?;
            println!("enabled {agent}/{schedule}");
        }
        Command::Disable { agent, schedule } => {
            client.disable_schedule(&agent, &schedule).await.map_err(to_exit_error)?;
            println!("disabled {agent}/{schedule}");
        }
        Command::Reload => {
            client.reload().await.map_err(to_exit_error)?;
            println!("reloaded");
        }
        Command::Logs { job_id, history_limit } => {
            let job_id = JobId::from_string(job_id);
            let mut stream = client.stream_job_output(&job_id, Some(history_limit)).await.map_err(to_exit_error)?;
            while let Some(record) = stream.next().await.map_err(to_exit_error)? {
                print_output_record(&record, format);
            }
        }
        Command::Stop { timeout_ms, no_wait } => {
            client.stop(timeout_ms, !no_wait, true).await.map_err(to_exit_error)?;
            println!("stopped");
        }
    }
    Ok(())
}

fn to_exit_error(err: herdctl_cli::client::ClientError) -> ExitError {
    ExitError::new(1, err.to_string())
}
