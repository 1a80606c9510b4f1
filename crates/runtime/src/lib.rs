// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herdctl-runtime: the Runtime interface consumed by the Job Executor (§6.3).
//!
//! The core treats the underlying agent call as opaque — this crate only
//! defines the contract ([`Runtime`], [`RuntimeJob`]) and a process-based
//! implementation. `herdctl-fleet`'s Job Executor drives a `RuntimeJob` to
//! completion and translates its messages into output records and job
//! status transitions.

pub mod contract;
pub mod error;
pub mod process;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use contract::{ExecuteRequest, Message, Runtime, RuntimeJob};
pub use error::RuntimeError;
pub use process::ProcessRuntime;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, ScriptedRun};
