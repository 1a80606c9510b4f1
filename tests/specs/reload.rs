use crate::prelude::fixture;

const INITIAL: &str = r#"
agents:
  scout:
    model: "claude-sonnet"
    working_directory: "/tmp"
  archivist:
    model: "claude-opus"
    working_directory: "/tmp"
"#;

/// Reloading against a config file that drops one agent and adds another
/// reports both in the diff, and the manager's resolved config reflects the
/// new set on the next status read.
#[tokio::test]
async fn reload_reports_added_and_removed_agents() {
    let fx = fixture(INITIAL);
    fx.manager.start().unwrap();

    std::fs::write(
        &fx.config_path,
        format!(
            r#"
agents:
  scout:
    model: "claude-sonnet"
    working_directory: "/tmp"
  sentinel:
    model: "claude-haiku"
    working_directory: "/tmp"
fleet:
  state_dir: {:?}
"#,
            fx.state_dir.display()
        ),
    )
    .unwrap();

    let new_config = herdctl_config::load(&fx.config_path).unwrap();
    let diff = fx.manager.reload(new_config).unwrap();
    assert_eq!(diff.added, vec!["sentinel".to_string()]);
    assert_eq!(diff.removed, vec!["archivist".to_string()]);
    assert!(diff.modified.is_empty());

    let status = fx.manager.get_fleet_status().unwrap();
    assert!(status.agents.contains_key("sentinel"));
    assert!(!status.agents.contains_key("archivist"));
}

/// A no-op reload (identical configuration) reports an empty diff.
#[tokio::test]
async fn reload_with_unchanged_config_reports_empty_diff() {
    let fx = fixture(INITIAL);
    fx.manager.start().unwrap();
    let same_config = herdctl_config::load(&fx.config_path).unwrap();
    let diff = fx.manager.reload(same_config).unwrap();
    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
    assert!(diff.modified.is_empty());
}
