// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue/admission errors (§7 "Queue errors").

/// Raised by `trigger()` callers that did not pass
/// `bypassConcurrencyLimit` when the agent is already at capacity
/// (§4.1 "trigger").
#[derive(Debug, Clone, thiserror::Error)]
#[error("agent {agent:?} is at capacity: {current}/{max} jobs running (hint: pass bypassConcurrencyLimit or wait for a slot to free up)")]
pub struct ConcurrencyLimitError {
    pub agent: String,
    pub current: u32,
    pub max: u32,
}
