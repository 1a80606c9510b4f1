// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic tick evaluator (§4.2).
//!
//! `Scheduler` owns the tick timer and the in-memory [`ScheduleState`] for
//! every time-driven schedule (§3 "Ownership"). It decides *what* is due and
//! computes the next occurrence; it does not itself perform admission,
//! persistence, or event emission — those belong to the Job Queue, the
//! Durable State Layer, and the Fleet Manager's event bus respectively.
//! [`Scheduler::tick`] takes an `admission` callback so this crate never
//! needs to depend on `herdctl-queue`: the caller (the Fleet Manager) is
//! the only place capacity decisions, persistence, and event dispatch meet.

use crate::error::SchedulerError;
use herdctl_core::{
    Clock, CronSchedule, ResolvedConfig, Schedule, ScheduleKind, ScheduleState, ScheduleStatus, SkipReason,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// What happened when a due schedule was evaluated this tick (§4.2 "Dispatch").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    pub agent: String,
    pub schedule: String,
    pub fired_at: u64,
    pub admitted: bool,
    pub skip_reason: Option<SkipReason>,
}

type ScheduleKey = (String, String);

/// Periodic evaluator over an agent catalogue's schedules (§4.2 "Tick loop").
pub struct Scheduler<C: Clock> {
    clock: C,
    check_interval: Duration,
    /// Fixed local-time offset from UTC used for cron evaluation (§4.2 "Cron semantics").
    local_offset_minutes: i64,
    config: RwLock<Arc<ResolvedConfig>>,
    states: Mutex<HashMap<ScheduleKey, ScheduleState>>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        clock: C,
        check_interval: Duration,
        local_offset_minutes: i64,
        config: ResolvedConfig,
        initial_states: HashMap<(String, String), ScheduleState>,
    ) -> Self {
        Self {
            clock,
            check_interval,
            local_offset_minutes,
            config: RwLock::new(Arc::new(config)),
            states: Mutex::new(initial_states),
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Atomically swap the agent catalogue (§4.1 "Reload contract"). Existing
    /// schedule timing state is preserved; schedules absent from the new
    /// catalogue simply stop being evaluated (their state lingers, harmless,
    /// until a future reload reintroduces them or the process restarts).
    pub fn reload(&self, config: ResolvedConfig) {
        *self.config.write() = Arc::new(config);
    }

    pub fn schedule_state(&self, agent: &str, schedule: &str) -> Option<ScheduleState> {
        self.states.lock().get(&(agent.to_string(), schedule.to_string())).cloned()
    }

    /// Flip a schedule's enabled bit (§4.1 "enableSchedule/disableSchedule").
    /// Disabling clears `next_run_at` (§3 invariant: null for disabled
    /// schedules); re-enabling recomputes it from now.
    pub fn set_enabled(&self, agent: &str, schedule: &str, enabled: bool) -> Result<ScheduleState, SchedulerError> {
        let config = self.config.read().clone();
        let schedule_def = lookup(&config, agent, schedule)?;
        let now = self.clock.epoch_ms();

        let mut states = self.states.lock();
        let key = (agent.to_string(), schedule.to_string());
        let state = states.entry(key).or_insert_with(|| fresh_state(schedule_def, now, self.local_offset_minutes));

        if enabled {
            state.status = ScheduleStatus::Idle;
            state.next_run_at = compute_next(schedule_def, now, self.local_offset_minutes);
        } else {
            state.status = ScheduleStatus::Disabled;
            state.next_run_at = None;
        }
        Ok(state.clone())
    }

    /// Reset a schedule from `running` back to `idle` once its dispatched
    /// job reaches a terminal status (§3 "Schedule State" invariant).
    pub fn mark_idle(&self, agent: &str, schedule: &str) {
        let mut states = self.states.lock();
        if let Some(state) = states.get_mut(&(agent.to_string(), schedule.to_string())) {
            if state.status == ScheduleStatus::Running {
                state.status = ScheduleStatus::Idle;
            }
        }
    }

    pub fn mark_error(&self, agent: &str, schedule: &str, message: String) {
        let mut states = self.states.lock();
        if let Some(state) = states.get_mut(&(agent.to_string(), schedule.to_string())) {
            state.status = ScheduleStatus::Idle;
            state.last_error = Some(message);
        }
    }

    /// Evaluate every time-driven schedule against the current clock value.
    ///
    /// For each due schedule, `admission(agent)` is called once to decide
    /// whether it may fire (`Ok(())`) or must be skipped (`Err(reason)`).
    /// Cron/interval timing state advances unconditionally either way (§4.2
    /// "Dispatch": "Cron/interval state rolls forward regardless").
    pub fn tick(&self, mut admission: impl FnMut(&str) -> Result<(), SkipReason>) -> Vec<Firing> {
        let now = self.clock.epoch_ms();
        let config = self.config.read().clone();
        let mut states = self.states.lock();
        let mut firings = Vec::new();

        for (agent_name, agent) in config.agents.iter() {
            for (schedule_name, schedule) in agent.schedules.iter() {
                if !schedule.is_time_driven() {
                    continue;
                }
                let key = (agent_name.clone(), schedule_name.clone());
                let state = states
                    .entry(key)
                    .or_insert_with(|| fresh_state(schedule, now, self.local_offset_minutes));

                if state.status == ScheduleStatus::Disabled {
                    continue;
                }
                let due = state.next_run_at.is_some_and(|t| now >= t);
                if !due {
                    continue;
                }

                let outcome = admission(agent_name);
                state.last_run_at = Some(now);
                state.next_run_at = compute_next(schedule, now, self.local_offset_minutes);

                let admitted = outcome.is_ok();
                if admitted {
                    state.status = ScheduleStatus::Running;
                } else {
                    tracing::debug!(agent = %agent_name, schedule = %schedule_name, "schedule skipped, not admitted");
                }

                firings.push(Firing {
                    agent: agent_name.clone(),
                    schedule: schedule_name.clone(),
                    fired_at: now,
                    admitted,
                    skip_reason: outcome.err(),
                });
            }
        }

        firings
    }
}

fn lookup<'a>(config: &'a ResolvedConfig, agent: &str, schedule: &str) -> Result<&'a Schedule, SchedulerError> {
    config
        .agents
        .get(agent)
        .and_then(|a| a.schedules.get(schedule))
        .ok_or_else(|| SchedulerError::UnknownSchedule { agent: agent.to_string(), schedule: schedule.to_string() })
}

fn fresh_state(schedule: &Schedule, now: u64, local_offset_minutes: i64) -> ScheduleState {
    ScheduleState {
        status: ScheduleStatus::Idle,
        last_run_at: None,
        next_run_at: compute_next(schedule, now, local_offset_minutes),
        last_error: None,
    }
}

/// Compute the schedule's next occurrence strictly after `now`. Interval
/// schedules advance from `now` (the instant just evaluated, standing in
/// for "last fire") rather than accumulating from history, which is what
/// gives the no-catch-up guarantee (§4.2 "Never perform catch-up").
fn compute_next(schedule: &Schedule, now: u64, local_offset_minutes: i64) -> Option<u64> {
    match schedule.kind {
        ScheduleKind::Interval => {
            let duration = herdctl_core::parse_duration(schedule.interval.as_deref()?).ok()?;
            Some(now + duration.as_millis() as u64)
        }
        ScheduleKind::Cron => {
            let cron = CronSchedule::parse(schedule.expression.as_deref()?).ok()?;
            cron.next_after(now, local_offset_minutes)
        }
        ScheduleKind::Webhook | ScheduleKind::Chat => None,
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
