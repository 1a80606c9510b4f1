// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herdctl-queue: the Job Queue & Concurrency Controller (§4.3).
//!
//! Gates job admission by per-agent and optional fleet-wide limits, and
//! queues manual/fork triggers (priority-then-FIFO) that cannot run
//! immediately. Scheduled triggers are never queued — a refusal is lossy by
//! design to prevent thundering-herd recovery after downtime (§4.2
//! "Dispatch").

pub mod controller;
pub mod error;
pub mod queued_job;

pub use controller::{CapacityCheck, EnqueueOutcome, EnqueueRequest, JobQueue};
pub use error::ConcurrencyLimitError;
pub use queued_job::QueuedJob;
