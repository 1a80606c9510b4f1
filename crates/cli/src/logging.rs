// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared `tracing` setup for both binaries (§6.4 `--log-level`, env
//! `HERDCTL_LOG_LEVEL`, `DEBUG=1|true`).

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber at `level` ("debug"|"info"|"warn"|"error").
///
/// Writes to stderr so stdout stays available for structured command
/// output (`--format json`).
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber =
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::trace!("tracing subscriber already installed");
    }
}
