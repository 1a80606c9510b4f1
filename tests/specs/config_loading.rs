use crate::prelude::fixture;
use herdctl_fleet::FleetLifecycle;

/// A minimal single-agent YAML config loads, resolves, and brings the
/// manager to `Initialized` with the agent's defaults applied.
#[test]
fn minimal_agent_config_initializes() {
    let fx = fixture(
        r#"
agents:
  scout:
    model: "claude-sonnet"
    working_directory: "/tmp"
"#,
    );
    assert_eq!(fx.manager.lifecycle(), FleetLifecycle::Initialized);
    let status = fx.manager.get_fleet_status().unwrap();
    let scout = &status.agents["scout"];
    assert_eq!(scout.max_concurrent, 1, "permission_mode/max_concurrent default to their loader fallbacks");
    assert_eq!(scout.running_count, 0);
}

/// `instances.max_concurrent` wins over a bare top-level `max_concurrent`
/// when both are present, matching the loader's precedence (§6.2).
#[test]
fn instances_max_concurrent_overrides_bare_field() {
    let fx = fixture(
        r#"
agents:
  worker:
    model: "claude-sonnet"
    working_directory: "/tmp"
    max_concurrent: 1
    instances:
      max_concurrent: 4
"#,
    );
    let status = fx.manager.get_fleet_status().unwrap();
    assert_eq!(status.agents["worker"].max_concurrent, 4);
}

/// An agent name that fails the loader's validity pattern is rejected
/// before it ever reaches the Fleet Manager.
#[test]
fn invalid_agent_name_is_rejected_at_load_time() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("herdctl.yaml");
    std::fs::write(
        &config_path,
        r#"
agents:
  "_bad name":
    model: "claude-sonnet"
    working_directory: "/tmp"
fleet:
  state_dir: /tmp/unused
"#,
    )
    .unwrap();
    let err = herdctl_config::load(&config_path).unwrap_err();
    assert!(matches!(err, herdctl_config::ConfigError::InvalidAgentName { .. }));
}

/// A cron schedule with an unparseable expression fails validation at load
/// time rather than surfacing later when the scheduler first evaluates it.
#[test]
fn malformed_cron_expression_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("herdctl.yaml");
    std::fs::write(
        &config_path,
        r#"
agents:
  archivist:
    model: "claude-sonnet"
    working_directory: "/tmp"
    schedules:
      nightly:
        type: cron
        expression: "not a cron expression"
fleet:
  state_dir: /tmp/unused
"#,
    )
    .unwrap();
    let err = herdctl_config::load(&config_path).unwrap_err();
    assert!(matches!(err, herdctl_config::ConfigError::InvalidSchedule { .. }));
}
