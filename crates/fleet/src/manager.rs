// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Fleet Manager: lifecycle state machine, public API, event bus owner
//! (§4.1). Coordinates the Scheduler, the Job Queue, the Durable State Layer,
//! and one Job Executor task per in-flight job — none of which know about
//! each other directly.

use crate::error::{FleetError, JobForkReason};
use crate::executor::{self, ExecutionOutcome, JobControl};
use crate::lifecycle::FleetLifecycle;
use crate::log_stream::JobOutputCursor;
use crate::types::{AgentInfo, FleetStatus, ForkOptions, ScheduleSnapshot, StopOptions, TriggerOptions, TriggerOutcome};
use herdctl_core::{
    AgentStatus, Clock, ConfigDiff, Event, EventBus, ExitReason, Job, JobId, JobStatus, ResolvedAgent, ResolvedConfig,
    ScheduleState, SkipReason, SubscriptionId, TerminationType, TriggerType,
};
use herdctl_queue::{ConcurrencyLimitError, EnqueueOutcome, EnqueueRequest, JobQueue, QueuedJob};
use herdctl_runtime::Runtime;
use herdctl_scheduler::{Scheduler, SchedulerError};
use herdctl_storage::StateLayer;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

struct Resources<C: Clock> {
    state: Arc<StateLayer>,
    queue: Arc<JobQueue>,
    scheduler: Arc<Scheduler<C>>,
}

impl<C: Clock> Clone for Resources<C> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone(), queue: self.queue.clone(), scheduler: self.scheduler.clone() }
    }
}

struct RunningJob {
    control: mpsc::UnboundedSender<JobControl>,
    done: watch::Receiver<bool>,
}

struct Inner<C: Clock> {
    clock: C,
    runtime: Arc<dyn Runtime>,
    lifecycle: RwLock<FleetLifecycle>,
    last_error: Mutex<Option<String>>,
    config: RwLock<Arc<ResolvedConfig>>,
    events: EventBus,
    resources: RwLock<Option<Resources<C>>>,
    running: Mutex<HashMap<JobId, RunningJob>>,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

/// The public supervisor handle (§4.1). Cheap to clone: every clone shares
/// the same underlying state via `Arc`, the way a spawned executor task
/// holds its own handle back to the manager that started it.
pub struct FleetManager<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for FleetManager<C> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<C: Clock> FleetManager<C> {
    pub fn new(clock: C, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock,
                runtime,
                lifecycle: RwLock::new(FleetLifecycle::Uninitialized),
                last_error: Mutex::new(None),
                config: RwLock::new(Arc::new(ResolvedConfig::default())),
                events: EventBus::new(),
                resources: RwLock::new(None),
                running: Mutex::new(HashMap::new()),
                tick_handle: Mutex::new(None),
            }),
        }
    }

    pub fn lifecycle(&self) -> FleetLifecycle {
        *self.inner.lifecycle.read()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    pub fn subscribe(&self, callback: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.events.subscribe(callback)
    }

    // -- lifecycle ---------------------------------------------------------

    /// `initialize()` (§4.1 "Lifecycle state machine"): loads the state
    /// directory, constructs the Scheduler and Job Queue, and restores
    /// persisted schedule timing so a restart does not reset due-ness.
    pub fn initialize(&self, config: ResolvedConfig) -> Result<(), FleetError> {
        self.require_lifecycle(&[FleetLifecycle::Uninitialized, FleetLifecycle::Stopped], "initialize")?;

        let state_dir = config.fleet.state_dir.clone().unwrap_or_else(|| std::path::PathBuf::from(".herdctl/state"));
        let state = StateLayer::new(state_dir);
        let init_result = state.initialize().and_then(|_| state.read_fleet_state());
        let persisted = match init_result {
            Ok(persisted) => persisted,
            Err(err) => {
                *self.inner.lifecycle.write() = FleetLifecycle::Error;
                *self.inner.last_error.lock() = Some(err.to_string());
                return Err(FleetError::from(err));
            }
        };

        let mut initial_states = HashMap::new();
        for (agent_name, agent_state) in &persisted.agents {
            for (schedule_name, schedule_state) in &agent_state.schedules {
                initial_states.insert((agent_name.clone(), schedule_name.clone()), schedule_state.clone());
            }
        }

        let queue = JobQueue::new(config.fleet.max_concurrent_jobs);
        let scheduler = Scheduler::new(self.inner.clock.clone(), Duration::from_secs(1), 0, config.clone(), initial_states);

        *self.inner.config.write() = Arc::new(config);
        *self.inner.resources.write() =
            Some(Resources { state: Arc::new(state), queue: Arc::new(queue), scheduler: Arc::new(scheduler) });
        *self.inner.lifecycle.write() = FleetLifecycle::Initialized;
        self.inner.events.emit(Event::Initialized);
        Ok(())
    }

    /// `start()`: spawns the scheduler tick loop and records `startedAt`.
    pub fn start(&self) -> Result<(), FleetError> {
        self.require_lifecycle(&[FleetLifecycle::Initialized], "start")?;
        *self.inner.lifecycle.write() = FleetLifecycle::Starting;

        let now = self.inner.clock.epoch_ms();
        if let Some(resources) = self.resources() {
            if let Err(err) = resources.state.update_fleet_state(|fs| fs.fleet.started_at = Some(now)) {
                tracing::warn!(error = %err, "failed to persist fleet start time");
            }
        }

        let manager = self.clone();
        let handle = tokio::spawn(async move { manager.tick_loop().await });
        *self.inner.tick_handle.lock() = Some(handle);

        *self.inner.lifecycle.write() = FleetLifecycle::Running;
        self.inner.events.emit(Event::Started { started_at: now });
        Ok(())
    }

    /// `stop(opts)` (§5 "Cancellation & timeouts"). Idempotent once stopped.
    pub async fn stop(&self, opts: StopOptions) -> Result<(), FleetError> {
        if self.lifecycle() == FleetLifecycle::Stopped {
            return Ok(());
        }
        self.require_lifecycle(&[FleetLifecycle::Running, FleetLifecycle::Starting], "stop")?;
        *self.inner.lifecycle.write() = FleetLifecycle::Stopping;

        if let Some(handle) = self.inner.tick_handle.lock().take() {
            handle.abort();
        }

        let pending: Vec<(JobId, watch::Receiver<bool>)> =
            self.inner.running.lock().iter().map(|(id, job)| (id.clone(), job.done.clone())).collect();

        if opts.wait_for_jobs {
            let wait_all = {
                let pending = pending.clone();
                async move {
                    for (_, mut done) in pending {
                        wait_done(&mut done).await;
                    }
                }
            };
            if tokio::time::timeout(opts.timeout, wait_all).await.is_err() {
                if opts.cancel_on_timeout {
                    self.cancel_all_forced(&pending).await;
                } else {
                    *self.inner.lifecycle.write() = FleetLifecycle::Error;
                    return Err(FleetError::Shutdown { timed_out: true });
                }
            }
        } else if opts.cancel_on_timeout {
            let _ = tokio::time::timeout(opts.timeout, self.cancel_all_forced(&pending)).await;
        }

        let now = self.inner.clock.epoch_ms();
        if let Some(resources) = self.resources() {
            if let Err(err) = resources.state.update_fleet_state(|fs| fs.fleet.stopped_at = Some(now)) {
                tracing::warn!(error = %err, "failed to persist fleet stop time");
            }
        }

        *self.inner.lifecycle.write() = FleetLifecycle::Stopped;
        self.inner.events.emit(Event::Stopped { stopped_at: now });
        Ok(())
    }

    async fn cancel_all_forced(&self, pending: &[(JobId, watch::Receiver<bool>)]) {
        let controls: Vec<mpsc::UnboundedSender<JobControl>> = {
            let running = self.inner.running.lock();
            pending.iter().filter_map(|(id, _)| running.get(id).map(|job| job.control.clone())).collect()
        };
        for control in &controls {
            let _ = control.send(JobControl::CancelForced);
        }
        for (_, mut done) in pending.to_vec() {
            wait_done(&mut done).await;
        }
    }

    /// `reload()` (§4.1 "Reload contract"). Validation is the caller's job —
    /// a caller that fails to resolve a new configuration simply never calls
    /// this, leaving the prior configuration untouched.
    pub fn reload(&self, new_config: ResolvedConfig) -> Result<ConfigDiff, FleetError> {
        self.require_lifecycle(
            &[FleetLifecycle::Initialized, FleetLifecycle::Starting, FleetLifecycle::Running, FleetLifecycle::Stopping],
            "reload",
        )?;
        let resources = self.resources_or_invalid("reload")?;
        let old_config = self.inner.config.read().clone();
        let diff = old_config.diff_agent_names(&new_config);
        resources.scheduler.reload(new_config.clone());
        *self.inner.config.write() = Arc::new(new_config);
        self.inner.events.emit(Event::ConfigReloaded { diff: diff.clone() });
        Ok(diff)
    }

    // -- public job operations ----------------------------------------------

    /// `trigger(agent, schedule?, opts?)` (§4.1 "trigger"). Admits a manual
    /// run directly against the Job Queue's capacity check; unlike
    /// `forkJob`, an over-capacity trigger is rejected outright rather than
    /// queued, matching the concurrency-cap seed scenario literally.
    pub fn trigger(&self, agent: &str, schedule: Option<&str>, opts: TriggerOptions) -> Result<TriggerOutcome, FleetError> {
        self.require_lifecycle(&[FleetLifecycle::Running], "trigger")?;
        let resources = self.resources_or_invalid("trigger")?;
        let config = self.inner.config.read().clone();
        let agent_cfg =
            config.agents.get(agent).cloned().ok_or_else(|| FleetError::UnknownAgent { agent: agent.to_string() })?;

        if let Some(schedule_name) = schedule {
            if !agent_cfg.schedules.contains_key(schedule_name) {
                return Err(FleetError::from(SchedulerError::UnknownSchedule {
                    agent: agent.to_string(),
                    schedule: schedule_name.to_string(),
                }));
            }
        }

        if !opts.bypass_concurrency_limit {
            let check = resources.queue.check_capacity(agent, agent_cfg.max_concurrent);
            if !check.can_run {
                return Err(FleetError::from(ConcurrencyLimitError {
                    agent: agent.to_string(),
                    current: check.current_running,
                    max: check.limit,
                }));
            }
        }

        let now = self.inner.clock.epoch_ms();
        let prompt = agent_cfg.resolve_prompt(opts.prompt.as_deref(), schedule);
        let job_id = JobId::new(now);
        let job = Job {
            id: job_id.clone(),
            agent: agent.to_string(),
            trigger_type: TriggerType::Manual,
            schedule: schedule.map(str::to_string),
            prompt: prompt.clone(),
            forked_from: None,
            session_id: None,
            started_at: now,
            finished_at: None,
            status: JobStatus::Running,
            exit_reason: None,
            error_message: None,
        };

        resources.queue.mark_started(agent);
        resources.state.write_job(&job)?;
        self.mark_agent_running(&resources, agent, &job_id);
        self.inner.events.emit(Event::JobCreated {
            job_id: job_id.clone(),
            agent: agent.to_string(),
            trigger_type: TriggerType::Manual,
        });

        let outcome = TriggerOutcome {
            job_id,
            agent: agent.to_string(),
            schedule: schedule.map(str::to_string),
            started_at: now,
            prompt,
        };
        self.spawn_executor(job, agent_cfg, schedule.map(str::to_string));
        Ok(outcome)
    }

    /// `cancelJob(jobId, {timeout?})` (§4.1 "cancelJob"). Escalates to forced
    /// termination if the runtime ignores the graceful request within
    /// `timeout` (default 10s).
    pub async fn cancel_job(&self, job_id: &JobId, timeout: Option<Duration>) -> Result<TerminationType, FleetError> {
        self.require_lifecycle(&[FleetLifecycle::Running, FleetLifecycle::Stopping], "cancelJob")?;
        let handle = self.inner.running.lock().get(job_id).map(|job| (job.control.clone(), job.done.clone()));

        let Some((control, mut done)) = handle else {
            let resources = self.resources_or_invalid("cancelJob")?;
            let job = match resources.state.try_read_job(job_id)? {
                Some(job) => job,
                None => return Err(FleetError::JobNotFound { job_id: job_id.clone() }),
            };
            if job.status.is_terminal() {
                return Ok(TerminationType::AlreadyStopped);
            }
            // Not yet running (still waiting in the queue): cancel it in
            // place, no runtime process exists to signal (§4.1 "cancelJob").
            resources.queue.remove(&job.agent, job_id);
            let mut job = job;
            let now = self.inner.clock.epoch_ms();
            job.finish(JobStatus::Cancelled, ExitReason::Cancelled, now);
            resources.state.write_job(&job)?;
            let duration_ms = now.saturating_sub(job.started_at);
            self.inner.events.emit(Event::JobCancelled {
                job_id: job_id.clone(),
                termination_type: TerminationType::Graceful,
                duration_ms,
            });
            return Ok(TerminationType::Graceful);
        };

        let timeout = timeout.unwrap_or(Duration::from_secs(10));
        let _ = control.send(JobControl::CancelGraceful);
        if tokio::time::timeout(timeout, wait_done(&mut done)).await.is_ok() {
            return Ok(TerminationType::Graceful);
        }
        let _ = control.send(JobControl::CancelForced);
        wait_done(&mut done).await;
        Ok(TerminationType::Forced)
    }

    /// `forkJob(jobId, opts)` (§4.1 "forkJob"). Routed through the Job
    /// Queue's literal enqueue semantics (priority-then-FIFO), unlike
    /// `trigger`, since no seed test constrains forks to reject outright.
    pub fn fork_job(&self, job_id: &JobId, opts: ForkOptions) -> Result<TriggerOutcome, FleetError> {
        self.require_lifecycle(&[FleetLifecycle::Running], "forkJob")?;
        let resources = self.resources_or_invalid("forkJob")?;
        let original = resources
            .state
            .try_read_job(job_id)?
            .ok_or_else(|| FleetError::JobFork { job_id: job_id.clone(), reason: JobForkReason::JobNotFound })?;

        let config = self.inner.config.read().clone();
        let agent_cfg = config.agents.get(&original.agent).cloned().ok_or_else(|| FleetError::JobFork {
            job_id: job_id.clone(),
            reason: JobForkReason::AgentNotFound,
        })?;

        let now = self.inner.clock.epoch_ms();
        let new_id = JobId::new(now);
        let schedule = opts.schedule.or_else(|| original.schedule.clone());
        let prompt = opts.prompt.or_else(|| original.prompt.clone());
        let job = Job {
            id: new_id.clone(),
            agent: original.agent.clone(),
            trigger_type: TriggerType::Fork,
            schedule: schedule.clone(),
            prompt: prompt.clone(),
            forked_from: Some(original.id.clone()),
            session_id: original.session_id.clone(),
            started_at: now,
            finished_at: None,
            status: JobStatus::Pending,
            exit_reason: None,
            error_message: None,
        };

        let enqueue_outcome = resources.queue.enqueue(
            EnqueueRequest {
                job_id: new_id.clone(),
                agent: original.agent.clone(),
                schedule: schedule.clone(),
                priority: 5,
                prompt: prompt.clone(),
                is_scheduled: false,
                queued_at: now,
            },
            agent_cfg.max_concurrent,
        );

        resources.state.write_job(&job)?;
        self.inner.events.emit(Event::JobCreated {
            job_id: new_id.clone(),
            agent: original.agent.clone(),
            trigger_type: TriggerType::Fork,
        });
        self.inner.events.emit(Event::JobForked { job_id: new_id.clone(), forked_from: original.id.clone() });

        match enqueue_outcome {
            EnqueueOutcome::Admitted => {
                resources.queue.mark_started(&original.agent);
                let mut running_job = job;
                running_job.status = JobStatus::Running;
                resources.state.write_job(&running_job)?;
                self.mark_agent_running(&resources, &original.agent, &new_id);
                self.spawn_executor(running_job, agent_cfg, schedule.clone());
            }
            EnqueueOutcome::Queued { position } => {
                self.inner.events.emit(Event::JobQueued { agent: original.agent.clone(), position });
            }
            EnqueueOutcome::Skipped { .. } => {
                // `enqueue` only takes this branch for scheduled triggers;
                // forks always pass `is_scheduled: false`.
            }
        }

        Ok(TriggerOutcome { job_id: new_id, agent: original.agent, schedule, started_at: now, prompt })
    }

    /// `enableSchedule`/`disableSchedule` (§4.1). Persisted so the decision
    /// survives a restart.
    pub fn enable_schedule(&self, agent: &str, schedule: &str) -> Result<ScheduleState, FleetError> {
        self.set_schedule_enabled(agent, schedule, true)
    }

    pub fn disable_schedule(&self, agent: &str, schedule: &str) -> Result<ScheduleState, FleetError> {
        self.set_schedule_enabled(agent, schedule, false)
    }

    fn set_schedule_enabled(&self, agent: &str, schedule: &str, enabled: bool) -> Result<ScheduleState, FleetError> {
        self.require_lifecycle(&[FleetLifecycle::Initialized, FleetLifecycle::Running], "enableSchedule/disableSchedule")?;
        let resources = self.resources_or_invalid("enableSchedule/disableSchedule")?;
        let state = resources.scheduler.set_enabled(agent, schedule, enabled)?;
        resources.state.update_fleet_state(|fs| {
            let entry = fs.agents.entry(agent.to_string()).or_default();
            entry.schedules.insert(schedule.to_string(), state.clone());
        })?;
        Ok(state)
    }

    // -- status queries -------------------------------------------------------

    /// `getFleetStatus()` (§4.1): a snapshot consistent within this call, not
    /// transactionally coupled to in-flight mutations.
    pub fn get_fleet_status(&self) -> Result<FleetStatus, FleetError> {
        let resources = self.resources_or_invalid("getFleetStatus")?;
        let config = self.inner.config.read().clone();
        let persisted = resources.state.read_fleet_state()?;

        let mut agents = HashMap::new();
        for (name, agent_cfg) in config.agents.iter() {
            let state = persisted.agents.get(name).cloned().unwrap_or_default();
            agents.insert(
                name.clone(),
                AgentInfo {
                    name: name.clone(),
                    status: state.status,
                    current_job: state.current_job,
                    last_job: state.last_job,
                    error_message: state.error_message,
                    max_concurrent: agent_cfg.max_concurrent,
                    running_count: resources.queue.running_count(name),
                    queue_len: resources.queue.queue_len(name),
                },
            );
        }

        Ok(FleetStatus {
            lifecycle: self.lifecycle(),
            started_at: persisted.fleet.started_at,
            stopped_at: persisted.fleet.stopped_at,
            agents,
        })
    }

    pub fn get_agent_info(&self, agent: &str) -> Result<AgentInfo, FleetError> {
        let status = self.get_fleet_status()?;
        status.agents.get(agent).cloned().ok_or_else(|| FleetError::UnknownAgent { agent: agent.to_string() })
    }

    pub fn get_schedules(&self, agent: &str) -> Result<ScheduleSnapshot, FleetError> {
        let resources = self.resources_or_invalid("getSchedules")?;
        let config = self.inner.config.read().clone();
        let agent_cfg =
            config.agents.get(agent).ok_or_else(|| FleetError::UnknownAgent { agent: agent.to_string() })?;
        let mut snapshot = HashMap::new();
        for schedule_name in agent_cfg.schedules.keys() {
            let state = resources.scheduler.schedule_state(agent, schedule_name).unwrap_or_default();
            snapshot.insert(schedule_name.clone(), state);
        }
        Ok(snapshot)
    }

    /// `streamJobOutput` (§4.1, §9 "Lazy sequences for log streaming").
    pub fn stream_job_output(&self, job_id: &JobId, history_limit: Option<usize>) -> Result<JobOutputCursor, FleetError> {
        let resources = self.resources_or_invalid("streamJobOutput")?;
        if resources.state.try_read_job(job_id)?.is_none() {
            return Err(FleetError::JobNotFound { job_id: job_id.clone() });
        }
        Ok(JobOutputCursor::new(resources.state.clone(), job_id.clone(), history_limit.unwrap_or(1000)))
    }

    // -- internals ------------------------------------------------------------

    async fn tick_loop(&self) {
        loop {
            let interval = match self.resources() {
                Some(resources) => resources.scheduler.check_interval(),
                None => return,
            };
            tokio::time::sleep(interval).await;
            if self.lifecycle() != FleetLifecycle::Running {
                return;
            }
            self.run_tick();
        }
    }

    /// One scheduler tick (§4.2 "Tick loop"/"Dispatch"): evaluate due
    /// schedules, admit or skip each, and dispatch admitted ones to a fresh
    /// executor.
    fn run_tick(&self) {
        let Some(resources) = self.resources() else { return };
        let config = self.inner.config.read().clone();

        let firings = resources.scheduler.tick(|agent_name| {
            let max_concurrent = config.agents.get(agent_name).map(|agent| agent.max_concurrent).unwrap_or(1);
            let check = resources.queue.check_capacity(agent_name, max_concurrent);
            if check.can_run {
                Ok(())
            } else {
                Err(check.reason.unwrap_or(SkipReason::AgentAtCapacity))
            }
        });

        for firing in firings {
            if !firing.admitted {
                self.inner.events.emit(Event::ScheduleSkipped {
                    agent: firing.agent,
                    schedule: firing.schedule,
                    reason: firing.skip_reason.unwrap_or(SkipReason::AgentAtCapacity),
                });
                continue;
            }

            let Some(agent_cfg) = config.agents.get(&firing.agent).cloned() else {
                tracing::warn!(agent = %firing.agent, schedule = %firing.schedule, "schedule fired for an agent no longer in the catalogue");
                continue;
            };

            let job_id = JobId::new(firing.fired_at);
            let prompt = agent_cfg.resolve_prompt(None, Some(&firing.schedule));
            let job = Job {
                id: job_id.clone(),
                agent: firing.agent.clone(),
                trigger_type: TriggerType::Schedule,
                schedule: Some(firing.schedule.clone()),
                prompt,
                forked_from: None,
                session_id: None,
                started_at: firing.fired_at,
                finished_at: None,
                status: JobStatus::Running,
                exit_reason: None,
                error_message: None,
            };

            resources.queue.mark_started(&firing.agent);
            if let Err(err) = resources.state.write_job(&job) {
                tracing::warn!(job_id = %job_id, error = %err, "failed to persist scheduled job");
            }
            self.mark_agent_running(&resources, &firing.agent, &job_id);
            self.inner.events.emit(Event::JobCreated {
                job_id: job_id.clone(),
                agent: firing.agent.clone(),
                trigger_type: TriggerType::Schedule,
            });
            self.inner.events.emit(Event::ScheduleTriggered {
                agent: firing.agent.clone(),
                schedule: firing.schedule.clone(),
                job_id: job_id.clone(),
            });
            self.inner.events.emit(Event::ScheduleTrigger {
                agent: firing.agent.clone(),
                schedule: firing.schedule.clone(),
                job_id,
            });
            self.spawn_executor(job, agent_cfg, Some(firing.schedule));
        }
    }

    fn spawn_executor(&self, job: Job, agent_cfg: ResolvedAgent, schedule: Option<String>) {
        let Some(resources) = self.resources() else { return };
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = watch::channel(false);
        self.inner.running.lock().insert(job.id.clone(), RunningJob { control: control_tx, done: done_rx });

        let clock = self.inner.clock.clone();
        let runtime = self.inner.runtime.clone();
        let events = self.inner.events.clone();
        let state = resources.state.clone();
        let manager = self.clone();
        let agent = job.agent.clone();

        tokio::spawn(async move {
            let outcome = executor::run_job(job, agent_cfg, clock, runtime, state, events, control_rx, done_tx).await;
            manager.finish_job(outcome, agent, schedule);
        });
    }

    /// Post-processing once an executor task returns: remove it from the
    /// running set, emit the terminal event, update persisted agent state,
    /// and admit the next queued waiter if capacity just freed up.
    fn finish_job(&self, outcome: ExecutionOutcome, agent: String, schedule: Option<String>) {
        self.inner.running.lock().remove(&outcome.job.id);
        let Some(resources) = self.resources() else { return };

        match outcome.job.status {
            JobStatus::Completed => {
                self.inner.events.emit(Event::JobCompleted { job_id: outcome.job.id.clone() });
            }
            JobStatus::Failed => {
                self.inner.events.emit(Event::JobFailed {
                    job_id: outcome.job.id.clone(),
                    error_message: outcome.job.error_message.clone().unwrap_or_default(),
                });
            }
            JobStatus::Cancelled => {
                let duration_ms =
                    outcome.job.finished_at.map(|finished| finished.saturating_sub(outcome.job.started_at)).unwrap_or(0);
                self.inner.events.emit(Event::JobCancelled {
                    job_id: outcome.job.id.clone(),
                    termination_type: outcome.termination.unwrap_or(TerminationType::Forced),
                    duration_ms,
                });
            }
            JobStatus::Pending | JobStatus::Running => {
                tracing::warn!(job_id = %outcome.job.id, "executor returned a non-terminal job status");
            }
        }

        if let Some(schedule_name) = &schedule {
            match outcome.job.status {
                JobStatus::Failed => {
                    let message = outcome.job.error_message.clone().unwrap_or_default();
                    resources.scheduler.mark_error(&agent, schedule_name, message.clone());
                    self.inner.events.emit(Event::ScheduleError {
                        agent: agent.clone(),
                        schedule: schedule_name.clone(),
                        job_id: outcome.job.id.clone(),
                        message,
                    });
                }
                _ => {
                    resources.scheduler.mark_idle(&agent, schedule_name);
                    if outcome.job.status == JobStatus::Completed {
                        self.inner.events.emit(Event::ScheduleComplete {
                            agent: agent.clone(),
                            schedule: schedule_name.clone(),
                            job_id: outcome.job.id.clone(),
                        });
                    }
                }
            }
        }

        self.record_agent_job_outcome(&resources, &agent, &outcome.job);

        if let Some(waiter) = resources.queue.mark_completed(&agent) {
            self.inner.events.emit(Event::CapacityAvailable { agent: agent.clone(), slots_free: 1 });
            self.admit_queued_waiter(&resources, waiter);
        }
    }

    /// Persist that `agent` now has `job_id` running (§3 "Agent State"
    /// invariant: `status = running` iff at least one job of this agent is
    /// in `running`/`pending`). Called on every admission path (`trigger`,
    /// `forkJob`, the scheduler's `run_tick`, and `admit_queued_waiter`).
    fn mark_agent_running(&self, resources: &Resources<C>, agent: &str, job_id: &JobId) {
        let job_id = job_id.clone();
        if let Err(err) = resources.state.update_fleet_state(|fs| {
            let entry = fs.agents.entry(agent.to_string()).or_default();
            entry.status = AgentStatus::Running;
            entry.current_job = Some(job_id.clone());
        }) {
            tracing::warn!(agent = %agent, error = %err, "failed to persist agent state after job admission");
        }
    }

    fn record_agent_job_outcome(&self, resources: &Resources<C>, agent: &str, job: &Job) {
        let status = if job.status == JobStatus::Failed { AgentStatus::Error } else { AgentStatus::Idle };
        let error_message = job.error_message.clone();
        let job_id = job.id.clone();
        if let Err(err) = resources.state.update_fleet_state(|fs| {
            let entry = fs.agents.entry(agent.to_string()).or_default();
            entry.status = status;
            entry.current_job = None;
            entry.last_job = Some(job_id.clone());
            entry.error_message = error_message.clone();
        }) {
            tracing::warn!(agent = %agent, error = %err, "failed to persist agent state after job completion");
        }
    }

    fn admit_queued_waiter(&self, resources: &Resources<C>, waiter: QueuedJob) {
        resources.queue.mark_started(&waiter.agent);
        let config = self.inner.config.read().clone();
        let Some(agent_cfg) = config.agents.get(&waiter.agent).cloned() else {
            tracing::warn!(agent = %waiter.agent, "queued job's agent no longer exists in configuration, dropping");
            return;
        };
        let mut job = match resources.state.try_read_job(&waiter.id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!(job_id = %waiter.id, "queued job has no persisted record, dropping");
                return;
            }
            Err(err) => {
                tracing::warn!(job_id = %waiter.id, error = %err, "failed to read queued job, dropping");
                return;
            }
        };
        job.status = JobStatus::Running;
        if let Err(err) = resources.state.write_job(&job) {
            tracing::warn!(job_id = %job.id, error = %err, "failed to persist admitted queued job");
        }
        self.mark_agent_running(resources, &waiter.agent, &job.id);
        self.spawn_executor(job, agent_cfg, waiter.schedule);
    }

    fn resources(&self) -> Option<Resources<C>> {
        self.inner.resources.read().clone()
    }

    fn resources_or_invalid(&self, method: &'static str) -> Result<Resources<C>, FleetError> {
        self.resources().ok_or(FleetError::InvalidState {
            method,
            current: self.lifecycle(),
            valid: &[FleetLifecycle::Initialized, FleetLifecycle::Running],
        })
    }

    fn require_lifecycle(&self, allowed: &'static [FleetLifecycle], method: &'static str) -> Result<(), FleetError> {
        let current = self.lifecycle();
        if allowed.contains(&current) {
            Ok(())
        } else {
            Err(FleetError::InvalidState { method, current, valid: allowed })
        }
    }
}

async fn wait_done(done: &mut watch::Receiver<bool>) {
    while !*done.borrow() {
        if done.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
