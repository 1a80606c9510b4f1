// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herdctl-storage: the durable state layer (§4.4, §6.1).
//!
//! Owns every file under `<stateDir>`: `state.yaml` (fleet + agent state),
//! `jobs/<id>/metadata.yaml` and `jobs/<id>/output.jsonl`, and
//! `sessions/<agent>.json`. All replace-style writes go through
//! [`atomic::write_atomic`]; output records are append-only. Mutations to a
//! given file are funneled through a per-path mutex so concurrent callers
//! within one process observe sequential writes (§4.4 "Concurrency") — the
//! layer is not safe for multi-process access on the same state directory
//! (§3 "Ownership").

pub mod atomic;
pub mod error;
pub mod paths;
pub mod state_layer;

pub use error::StateError;
pub use state_layer::StateLayer;
