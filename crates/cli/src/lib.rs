// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herdctl-cli: the `herdctld` daemon binary and the `herdctl` control CLI
//! (§6.4). Thin process-boundary glue around [`herdctl_fleet::FleetManager`]
//! — every interesting invariant lives in the crates it wires together.

pub mod client;
pub mod color;
pub mod env;
pub mod exit_error;
pub mod logging;
pub mod output;
pub mod protocol;
pub mod server;
pub mod wire;

pub use exit_error::ExitError;
