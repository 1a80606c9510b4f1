// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::Agent;
use crate::config::{FleetConfig, ResolvedConfig};
use crate::schedule::{Schedule, ScheduleKind};
use std::collections::HashMap;

/// Proptest strategies for core value types.
pub mod strategies {
    use proptest::prelude::*;

    /// A 5-field cron expression built from valid-range field values, used by
    /// the monotonicity property test in `cron.rs`.
    pub fn arb_cron_expression() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("*".to_string()), (0u32..60).prop_map(|m| m.to_string())],
            prop_oneof![Just("*".to_string()), (0u32..24).prop_map(|h| h.to_string())],
            Just("*".to_string()),
            Just("*".to_string()),
            prop_oneof![Just("*".to_string()), (0u32..7).prop_map(|d| d.to_string())],
        )
            .prop_map(|(min, hour, dom, month, dow)| format!("{min} {hour} {dom} {month} {dow}"))
    }
}

/// A small, valid two-agent fixture: one interval-scheduled, one cron-scheduled.
pub fn fixture_config() -> ResolvedConfig {
    let mut scout_schedules = HashMap::new();
    scout_schedules.insert(
        "poll".to_string(),
        Schedule { kind: ScheduleKind::Interval, interval: Some("5m".to_string()), expression: None, prompt: None },
    );
    let scout = Agent::builder().name("scout").schedules(scout_schedules).build();

    let mut archivist_schedules = HashMap::new();
    archivist_schedules.insert(
        "nightly".to_string(),
        Schedule { kind: ScheduleKind::Cron, interval: None, expression: Some("0 0 * * *".to_string()), prompt: None },
    );
    let archivist = Agent::builder().name("archivist").schedules(archivist_schedules).build();

    let mut agents = HashMap::new();
    agents.insert(scout.name.clone(), scout);
    agents.insert(archivist.name.clone(), archivist);

    ResolvedConfig { fleet: FleetConfig::default(), agents }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
