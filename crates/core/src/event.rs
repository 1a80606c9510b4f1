// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event catalogue and event bus (§4.1 "Event bus", §9 "Event dispatch
//! abstraction").
//!
//! Dispatch is single-threaded and synchronous: subscribers are invoked in
//! registration order on the emitting thread. Emitting from inside a handler
//! recurses immediately (depth-first visit order) because dispatch is a
//! plain synchronous call stack, not a queue — a handler that emits a second
//! event sees that event fully dispatched to *its* subscribers before the
//! outer dispatch continues to the next subscriber of the first event. A
//! panicking handler is caught so it cannot block delivery to the handlers
//! registered after it.

use crate::id::JobId;
use crate::job::TriggerType;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Why a schedule's due fire was not admitted (§4.2 "Dispatch").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AgentAtCapacity,
    FleetAtCapacity,
}

crate::simple_display! {
    SkipReason {
        AgentAtCapacity => "agent_at_capacity",
        FleetAtCapacity => "fleet_at_capacity",
    }
}

/// How a cancelled job's runtime was actually stopped (§4.1 "cancelJob").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationType {
    Graceful,
    Forced,
    /// The job was already terminal when cancellation was requested.
    AlreadyStopped,
}

crate::simple_display! {
    TerminationType {
        Graceful => "graceful",
        Forced => "forced",
        AlreadyStopped => "already_stopped",
    }
}

/// A named/removed/modified diff entry in a `config:reloaded` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub summary: String,
}

/// Events emitted by the Fleet Manager's event bus (§4.1 "Event catalogue").
///
/// `ScheduleTrigger`/`ScheduleComplete`/`ScheduleError` are the legacy,
/// backward-compatible aliases of `ScheduleTriggered`/`JobCompleted`/
/// `JobFailed` kept for subscribers written against the older names; new
/// code should subscribe to the non-legacy variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "initialized")]
    Initialized,
    #[serde(rename = "started")]
    Started { started_at: u64 },
    #[serde(rename = "stopped")]
    Stopped { stopped_at: u64 },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "config:reloaded")]
    ConfigReloaded { diff: ConfigDiff },
    #[serde(rename = "agent:started")]
    AgentStarted { agent: String },
    #[serde(rename = "agent:stopped")]
    AgentStopped { agent: String },
    #[serde(rename = "schedule:triggered")]
    ScheduleTriggered { agent: String, schedule: String, job_id: JobId },
    #[serde(rename = "schedule:skipped")]
    ScheduleSkipped { agent: String, schedule: String, reason: SkipReason },
    #[serde(rename = "job:created")]
    JobCreated { job_id: JobId, agent: String, trigger_type: TriggerType },
    #[serde(rename = "job:output")]
    JobOutput { job_id: JobId, content: Option<String>, record_type: String },
    #[serde(rename = "job:completed")]
    JobCompleted { job_id: JobId },
    #[serde(rename = "job:failed")]
    JobFailed { job_id: JobId, error_message: String },
    #[serde(rename = "job:cancelled")]
    JobCancelled { job_id: JobId, termination_type: TerminationType, duration_ms: u64 },
    #[serde(rename = "job:forked")]
    JobForked { job_id: JobId, forked_from: JobId },
    #[serde(rename = "job:queued")]
    JobQueued { agent: String, position: u32 },
    #[serde(rename = "capacity:available")]
    CapacityAvailable { agent: String, slots_free: u32 },

    // -- legacy aliases (§4.1) --
    #[serde(rename = "schedule:trigger")]
    ScheduleTrigger { agent: String, schedule: String, job_id: JobId },
    #[serde(rename = "schedule:complete")]
    ScheduleComplete { agent: String, schedule: String, job_id: JobId },
    #[serde(rename = "schedule:error")]
    ScheduleError { agent: String, schedule: String, job_id: JobId, message: String },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Initialized => "initialized",
            Event::Started { .. } => "started",
            Event::Stopped { .. } => "stopped",
            Event::Error { .. } => "error",
            Event::ConfigReloaded { .. } => "config:reloaded",
            Event::AgentStarted { .. } => "agent:started",
            Event::AgentStopped { .. } => "agent:stopped",
            Event::ScheduleTriggered { .. } => "schedule:triggered",
            Event::ScheduleSkipped { .. } => "schedule:skipped",
            Event::JobCreated { .. } => "job:created",
            Event::JobOutput { .. } => "job:output",
            Event::JobCompleted { .. } => "job:completed",
            Event::JobFailed { .. } => "job:failed",
            Event::JobCancelled { .. } => "job:cancelled",
            Event::JobForked { .. } => "job:forked",
            Event::JobQueued { .. } => "job:queued",
            Event::CapacityAvailable { .. } => "capacity:available",
            Event::ScheduleTrigger { .. } => "schedule:trigger",
            Event::ScheduleComplete { .. } => "schedule:complete",
            Event::ScheduleError { .. } => "schedule:error",
        }
    }
}

type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

/// Single-threaded, synchronous pub/sub registry (§4.1 "Event bus").
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

/// Handle returned by [`EventBus::subscribe`]; drop or pass to
/// [`EventBus::unsubscribe`] to stop receiving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { subscribers: Arc::new(Mutex::new(Vec::new())), next_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Register a callback invoked for every emitted event, in registration order.
    pub fn subscribe(&self, callback: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().push(Subscriber { id, callback: Arc::new(callback) });
        SubscriptionId(id)
    }

    /// Register a callback invoked only for events whose name matches `event_name`
    /// (the typed `subscribe<EventKind>` helper from §9's design notes).
    pub fn subscribe_to(
        &self,
        event_name: &'static str,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribe(move |event| {
            if event.name() == event_name {
                callback(event);
            }
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|s| s.id != id.0);
    }

    /// Dispatch `event` to every current subscriber, in registration order.
    ///
    /// Subscribers are snapshotted (cloned `Arc` callbacks) before dispatch
    /// so a handler that subscribes/unsubscribes during dispatch doesn't
    /// observe a torn list, and a handler that emits a nested event recurses
    /// synchronously (depth-first) rather than enqueuing.
    pub fn emit(&self, event: Event) {
        let snapshot: Vec<Callback> = self.subscribers.lock().iter().map(|s| s.callback.clone()).collect();
        for callback in &snapshot {
            let _ = std::panic::catch_unwind(AssertUnwindSafe(|| callback(&event)));
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
