// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `herdctld` — the daemon that hosts one [`herdctl_fleet::FleetManager`]
//! for the lifetime of the process (§1, §4.1). Not meant to be run twice
//! against the same state directory (§3 "Ownership").

use clap::Parser;
use herdctl_cli::env::{default_state_dir, resolve_log_level, socket_path};
use herdctl_cli::{logging, server, ExitError};
use herdctl_core::SystemClock;
use herdctl_fleet::{FleetManager, StopOptions};
use herdctl_runtime::ProcessRuntime;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "herdctld", version, styles = herdctl_cli::color::styles())]
struct Cli {
    /// Path to the fleet configuration file (§6.2).
    #[arg(long)]
    config: PathBuf,

    /// State directory override; falls back to `fleet.state_dir` in the
    /// config, then `~/.herdctl` (§6.4).
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Minimum log level (§6.4). Overridden by `DEBUG=1|true`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("herdctld: {err}");
        std::process::exit(err.code);
    }
}

async fn run() -> Result<(), ExitError> {
    let cli = Cli::parse();
    logging::init(&resolve_log_level(cli.log_level.as_deref()));

    let mut config = herdctl_config::load(&cli.config)
        .map_err(|err| ExitError::new(1, format!("failed to load configuration: {err}")))?;
    let state_dir = cli
        .state_dir
        .clone()
        .or_else(|| config.fleet.state_dir.clone())
        .unwrap_or_else(default_state_dir);
    config.fleet.state_dir = Some(state_dir.clone());

    let runtime = Arc::new(ProcessRuntime::new("claude"));
    let manager = FleetManager::new(SystemClock, runtime);

    manager
        .initialize(config)
        .map_err(|err| ExitError::new(1, format!("failed to initialize fleet: {err}")))?;
    manager.start().map_err(|err| ExitError::new(1, format!("failed to start fleet: {err}")))?;

    tracing::info!(state_dir = %state_dir.display(), "herdctld started");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let socket = socket_path(&state_dir);
    let serve_manager = manager.clone();
    let serve_config_path = cli.config.clone();
    let serve_socket = socket.clone();
    let serve_handle = tokio::spawn(async move {
        if let Err(err) = server::serve(serve_manager, serve_config_path, &serve_socket, shutdown_rx).await {
            tracing::error!(error = %err, "control socket server exited with an error");
        }
    });

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping fleet");

    let _ = shutdown_tx.send(true);
    let stopped = manager.stop(StopOptions::default()).await;
    let _ = serve_handle.await;

    match stopped {
        Ok(()) => Ok(()),
        Err(err) if matches!(err, herdctl_fleet::FleetError::Shutdown { timed_out: true }) => {
            Err(ExitError::new(2, format!("shutdown did not complete cleanly: {err}")))
        }
        Err(err) => Err(ExitError::new(1, format!("error while stopping fleet: {err}"))),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return tokio::signal::ctrl_c().await.unwrap_or(()),
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(_) => return tokio::signal::ctrl_c().await.unwrap_or(()),
    };
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
