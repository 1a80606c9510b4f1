// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Queue & Concurrency Controller (§4.3).
//!
//! Owns the running-job counters and the per-agent priority queues.
//! Per-agent `max_concurrent` and the optional fleet-wide cap are *not*
//! cached here — they live in the read-mostly configuration the Fleet
//! Manager owns (§5 "Shared-resource policy") and are passed in on every
//! call, so a `reload()` swap is reflected on the very next admission
//! decision without this crate needing to know about reload at all.

use crate::queued_job::QueuedJob;
use herdctl_core::{JobId, SkipReason};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of [`JobQueue::check_capacity`] (§4.3 "Capacity check").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityCheck {
    pub can_run: bool,
    pub reason: Option<SkipReason>,
    pub current_running: u32,
    pub limit: u32,
}

/// What `enqueue` decided to do with a trigger (§4.3 "Enqueue semantics").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Capacity was free; the caller should run the job now.
    Admitted,
    /// Manual/fork trigger queued behind other work; `position` is 1-based.
    Queued { position: u32 },
    /// A scheduled trigger found no capacity. Scheduled triggers are never
    /// queued (§4.3: "the scheduler never builds a backlog").
    Skipped { reason: SkipReason },
}

/// A request to admit or queue a trigger (§3 "Queued Job").
pub struct EnqueueRequest {
    pub job_id: JobId,
    pub agent: String,
    pub schedule: Option<String>,
    pub priority: u32,
    pub prompt: Option<String>,
    pub is_scheduled: bool,
    pub queued_at: u64,
}

#[derive(Default)]
struct Counters {
    running: HashMap<String, u32>,
    total_running: u32,
}

/// Per-agent waiting queues plus running-job counters (§4.3).
pub struct JobQueue {
    counters: Mutex<Counters>,
    queues: Mutex<HashMap<String, VecDeque<QueuedJob>>>,
    fleet_limit: Option<u32>,
    next_seq: AtomicU64,
}

impl JobQueue {
    pub fn new(fleet_limit: Option<u32>) -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            queues: Mutex::new(HashMap::new()),
            fleet_limit,
            next_seq: AtomicU64::new(0),
        }
    }

    /// `checkCapacity(agent)` (§4.3): denies with `agent_at_capacity` before
    /// `fleet_at_capacity` — an agent already saturated is the more specific
    /// reason even when the fleet is also full.
    pub fn check_capacity(&self, agent: &str, max_concurrent: u32) -> CapacityCheck {
        let counters = self.counters.lock();
        let current_running = *counters.running.get(agent).unwrap_or(&0);

        if current_running >= max_concurrent {
            return CapacityCheck {
                can_run: false,
                reason: Some(SkipReason::AgentAtCapacity),
                current_running,
                limit: max_concurrent,
            };
        }
        if let Some(fleet_limit) = self.fleet_limit {
            if counters.total_running >= fleet_limit {
                return CapacityCheck {
                    can_run: false,
                    reason: Some(SkipReason::FleetAtCapacity),
                    current_running,
                    limit: max_concurrent,
                };
            }
        }
        CapacityCheck { can_run: true, reason: None, current_running, limit: max_concurrent }
    }

    /// `enqueue(...)` (§4.3 "Enqueue semantics"). Does not mutate the
    /// running counters itself — the caller admits via [`Self::mark_started`]
    /// once it has actually started the job (so a job that fails to spawn
    /// never inflates the counters).
    pub fn enqueue(&self, req: EnqueueRequest, max_concurrent: u32) -> EnqueueOutcome {
        let check = self.check_capacity(&req.agent, max_concurrent);
        if check.can_run {
            return EnqueueOutcome::Admitted;
        }

        if req.is_scheduled {
            let reason = check.reason.unwrap_or(SkipReason::AgentAtCapacity);
            tracing::debug!(agent = %req.agent, %reason, "scheduled trigger skipped, not queued");
            return EnqueueOutcome::Skipped { reason };
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let entry = QueuedJob {
            id: req.job_id,
            agent: req.agent.clone(),
            schedule: req.schedule,
            priority: req.priority,
            queued_at: req.queued_at,
            prompt: req.prompt,
            is_scheduled: req.is_scheduled,
            seq,
        };

        let mut queues = self.queues.lock();
        let queue = queues.entry(req.agent).or_default();
        let insert_at = queue.partition_point(|existing| existing <= &entry);
        queue.insert(insert_at, entry);
        EnqueueOutcome::Queued { position: (insert_at + 1) as u32 }
    }

    /// Record that a job actually started running for `agent`.
    pub fn mark_started(&self, agent: &str) {
        let mut counters = self.counters.lock();
        *counters.running.entry(agent.to_string()).or_insert(0) += 1;
        counters.total_running += 1;
    }

    /// Record that a job for `agent` finished (any terminal status) and
    /// dequeue the next eligible waiter, if capacity now permits (§4.3
    /// "Dequeue & capacity-available"). Returns the waiter the caller
    /// should now admit (the caller must still call [`Self::mark_started`]
    /// for it).
    pub fn mark_completed(&self, agent: &str) -> Option<QueuedJob> {
        {
            let mut counters = self.counters.lock();
            if let Some(count) = counters.running.get_mut(agent) {
                *count = count.saturating_sub(1);
            }
            counters.total_running = counters.total_running.saturating_sub(1);
        }
        self.dequeue_next(agent)
    }

    /// Pop the highest-priority waiter for `agent` if fleet capacity (not
    /// agent capacity — the caller just freed exactly one slot) permits.
    fn dequeue_next(&self, agent: &str) -> Option<QueuedJob> {
        let counters = self.counters.lock();
        if let Some(fleet_limit) = self.fleet_limit {
            if counters.total_running >= fleet_limit {
                return None;
            }
        }
        drop(counters);

        let mut queues = self.queues.lock();
        let queue = queues.get_mut(agent)?;
        queue.pop_front()
    }

    pub fn running_count(&self, agent: &str) -> u32 {
        *self.counters.lock().running.get(agent).unwrap_or(&0)
    }

    pub fn total_running(&self) -> u32 {
        self.counters.lock().total_running
    }

    pub fn queue_len(&self, agent: &str) -> usize {
        self.queues.lock().get(agent).map_or(0, VecDeque::len)
    }

    /// 1-based position of `job_id` in its agent's queue, if still waiting.
    pub fn queue_position(&self, agent: &str, job_id: &JobId) -> Option<u32> {
        let queues = self.queues.lock();
        let queue = queues.get(agent)?;
        queue.iter().position(|j| &j.id == job_id).map(|p| (p + 1) as u32)
    }

    /// Remove `job_id` from `agent`'s waiting queue (e.g. on cancellation of
    /// a job that has not yet been admitted). Returns `true` if it was found
    /// and removed.
    pub fn remove(&self, agent: &str, job_id: &JobId) -> bool {
        let mut queues = self.queues.lock();
        let Some(queue) = queues.get_mut(agent) else { return false };
        let Some(pos) = queue.iter().position(|j| &j.id == job_id) else { return false };
        queue.remove(pos);
        true
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
