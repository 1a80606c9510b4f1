// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn job(priority: u32, queued_at: u64, seq: u64) -> QueuedJob {
    QueuedJob {
        id: JobId::new(queued_at),
        agent: "scout".to_string(),
        schedule: None,
        priority,
        queued_at,
        prompt: None,
        is_scheduled: false,
        seq,
    }
}

#[test]
fn lower_priority_number_sorts_first() {
    let high = job(1, 100, 0);
    let low = job(5, 100, 1);
    assert!(high < low);
}

#[test]
fn equal_priority_breaks_tie_on_queued_at() {
    let earlier = job(5, 100, 1);
    let later = job(5, 200, 0);
    assert!(earlier < later);
}

#[test]
fn equal_priority_and_time_breaks_tie_on_sequence() {
    let first = job(5, 100, 0);
    let second = job(5, 100, 1);
    assert!(first < second);
}
