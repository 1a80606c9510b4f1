// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet Manager lifecycle state machine (§4.1 "Lifecycle state machine").

use serde::{Deserialize, Serialize};

/// `uninitialized -> initialized -> starting -> running -> stopping ->
/// stopped`; any state may transition to `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetLifecycle {
    Uninitialized,
    Initialized,
    Starting,
    Running,
    Stopping,
    Stopped,
    Error,
}

herdctl_core::simple_display! {
    FleetLifecycle {
        Uninitialized => "uninitialized",
        Initialized => "initialized",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Error => "error",
    }
}

impl Default for FleetLifecycle {
    fn default() -> Self {
        Self::Uninitialized
    }
}
