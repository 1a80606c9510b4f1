// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use herdctl_core::JobId;

fn req(agent: &str, priority: u32, queued_at: u64, scheduled: bool) -> EnqueueRequest {
    EnqueueRequest {
        job_id: JobId::new(queued_at),
        agent: agent.to_string(),
        schedule: None,
        priority,
        prompt: None,
        is_scheduled: scheduled,
        queued_at,
    }
}

#[test]
fn admits_when_capacity_is_free() {
    let queue = JobQueue::new(None);
    let outcome = queue.enqueue(req("scout", 5, 0, false), 1);
    assert_eq!(outcome, EnqueueOutcome::Admitted);
}

#[test]
fn denies_agent_at_capacity() {
    let queue = JobQueue::new(None);
    queue.mark_started("scout");
    let check = queue.check_capacity("scout", 1);
    assert!(!check.can_run);
    assert_eq!(check.reason, Some(SkipReason::AgentAtCapacity));
}

#[test]
fn denies_fleet_at_capacity_when_agent_has_room() {
    let queue = JobQueue::new(Some(1));
    queue.mark_started("scout");
    let check = queue.check_capacity("archivist", 5);
    assert!(!check.can_run);
    assert_eq!(check.reason, Some(SkipReason::FleetAtCapacity));
}

#[test]
fn agent_capacity_takes_precedence_over_fleet_capacity() {
    let queue = JobQueue::new(Some(1));
    queue.mark_started("scout");
    let check = queue.check_capacity("scout", 1);
    assert_eq!(check.reason, Some(SkipReason::AgentAtCapacity));
}

#[test]
fn scheduled_trigger_is_skipped_not_queued_when_full() {
    let queue = JobQueue::new(None);
    queue.mark_started("scout");
    let outcome = queue.enqueue(req("scout", 5, 1, true), 1);
    assert_eq!(outcome, EnqueueOutcome::Skipped { reason: SkipReason::AgentAtCapacity });
    assert_eq!(queue.queue_len("scout"), 0);
}

#[test]
fn manual_trigger_queues_when_full() {
    let queue = JobQueue::new(None);
    queue.mark_started("scout");
    let outcome = queue.enqueue(req("scout", 5, 1, false), 1);
    assert_eq!(outcome, EnqueueOutcome::Queued { position: 1 });
    assert_eq!(queue.queue_len("scout"), 1);
}

#[test]
fn queue_order_is_priority_then_fifo() {
    let queue = JobQueue::new(None);
    queue.mark_started("scout");
    let first = req("scout", 5, 100, false);
    let first_id = first.job_id.clone();
    queue.enqueue(first, 1);
    let second = req("scout", 1, 200, false);
    let second_id = second.job_id.clone();
    queue.enqueue(second, 1);

    // Lower priority number (1) jumps ahead of the earlier-enqueued priority 5.
    assert_eq!(queue.queue_position("scout", &second_id), Some(1));
    assert_eq!(queue.queue_position("scout", &first_id), Some(2));
}

#[test]
fn equal_priority_preserves_arrival_order() {
    let queue = JobQueue::new(None);
    queue.mark_started("scout");
    let a = req("scout", 5, 100, false);
    let a_id = a.job_id.clone();
    queue.enqueue(a, 1);
    let b = req("scout", 5, 200, false);
    let b_id = b.job_id.clone();
    queue.enqueue(b, 1);

    assert_eq!(queue.queue_position("scout", &a_id), Some(1));
    assert_eq!(queue.queue_position("scout", &b_id), Some(2));
}

#[test]
fn mark_completed_dequeues_highest_priority_waiter() {
    let queue = JobQueue::new(None);
    queue.mark_started("scout");
    queue.enqueue(req("scout", 5, 100, false), 1);
    let high_priority = req("scout", 1, 200, false);
    let high_id = high_priority.job_id.clone();
    queue.enqueue(high_priority, 1);

    let dequeued = queue.mark_completed("scout").expect("a waiter should be admitted");
    assert_eq!(dequeued.id, high_id);
    assert_eq!(queue.queue_len("scout"), 1);
}

#[test]
fn mark_completed_respects_fleet_capacity() {
    let queue = JobQueue::new(Some(1));
    queue.mark_started("scout");
    queue.mark_started("archivist"); // pushes fleet to its limit via a second agent running outside the cap for setup
    queue.enqueue(req("scout", 5, 1, false), 1);

    // scout finishes, but the fleet is still saturated by archivist.
    let dequeued = queue.mark_completed("scout");
    assert_eq!(dequeued, None);
}

#[test]
fn counters_never_go_negative_on_unbalanced_completion() {
    let queue = JobQueue::new(None);
    assert_eq!(queue.mark_completed("scout"), None);
    assert_eq!(queue.running_count("scout"), 0);
    assert_eq!(queue.total_running(), 0);
}

mod invariants {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Start(usize),
        Complete(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![(0usize..3).prop_map(Op::Start), (0usize..3).prop_map(Op::Complete)]
    }

    proptest! {
        /// §8 invariant: total_running == sum of per-agent running counts,
        /// and no per-agent count ever exceeds its configured max (enforced
        /// here by only starting a job the capacity check allowed).
        #[test]
        fn totals_always_match_and_never_exceed_limits(ops in prop::collection::vec(arb_op(), 0..200)) {
            let agents = ["a", "b", "c"];
            let max_concurrent = 2u32;
            let queue = JobQueue::new(Some(3));

            for op in ops {
                match op {
                    Op::Start(i) => {
                        let agent = agents[i];
                        if queue.check_capacity(agent, max_concurrent).can_run {
                            queue.mark_started(agent);
                        }
                    }
                    Op::Complete(i) => {
                        queue.mark_completed(agents[i]);
                    }
                }

                let sum: u32 = agents.iter().map(|a| queue.running_count(a)).sum();
                prop_assert_eq!(sum, queue.total_running());
                for agent in agents {
                    prop_assert!(queue.running_count(agent) <= max_concurrent);
                }
                prop_assert!(queue.total_running() <= 3);
            }
        }
    }
}
