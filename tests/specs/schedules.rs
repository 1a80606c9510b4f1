use crate::prelude::fixture;
use herdctl_core::ScheduleStatus;

const CONFIG: &str = r#"
agents:
  archivist:
    model: "claude-opus"
    working_directory: "/tmp"
    schedules:
      poll:
        type: interval
        interval: "5m"
      nightly:
        type: cron
        expression: "0 0 * * *"
"#;

/// Disabling a schedule is reflected immediately and survives a simulated
/// restart (re-reading the persisted fleet state into a fresh manager).
#[tokio::test]
async fn disabled_schedule_survives_a_restart() {
    let fx = fixture(CONFIG);
    fx.manager.start().unwrap();

    let state = fx.manager.disable_schedule("archivist", "poll").unwrap();
    assert_eq!(state.status, ScheduleStatus::Disabled);

    let before = fx.manager.get_schedules("archivist").unwrap();
    assert_eq!(before["poll"].status, ScheduleStatus::Disabled);
    assert_eq!(before["nightly"].status, ScheduleStatus::Idle);

    fx.manager.stop(herdctl_fleet::StopOptions::default()).await.unwrap();

    let config = herdctl_config::load(&fx.config_path).unwrap();
    let restarted = herdctl_fleet::FleetManager::new(fx.clock.clone(), std::sync::Arc::new(fx.runtime.clone()));
    restarted.initialize(config).unwrap();
    let schedules = restarted.get_schedules("archivist").unwrap();
    assert_eq!(schedules["poll"].status, ScheduleStatus::Disabled, "disabled flag must be read back from disk");
}

/// Re-enabling a disabled schedule restores it to idle.
#[tokio::test]
async fn re_enabling_a_schedule_restores_idle() {
    let fx = fixture(CONFIG);
    fx.manager.start().unwrap();
    fx.manager.disable_schedule("archivist", "poll").unwrap();
    let state = fx.manager.enable_schedule("archivist", "poll").unwrap();
    assert_eq!(state.status, ScheduleStatus::Idle);
}

/// Querying schedules for an agent that doesn't exist is rejected rather
/// than returning an empty map.
#[tokio::test]
async fn schedules_for_unknown_agent_is_rejected() {
    let fx = fixture(CONFIG);
    fx.manager.start().unwrap();
    let err = fx.manager.get_schedules("ghost").unwrap_err();
    assert!(matches!(err, herdctl_fleet::FleetError::UnknownAgent { .. }));
}
