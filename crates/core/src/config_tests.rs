// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn config_with(agents: Vec<Agent>) -> ResolvedConfig {
    let mut map = HashMap::new();
    for agent in agents {
        map.insert(agent.name.clone(), agent);
    }
    ResolvedConfig { fleet: FleetConfig::default(), agents: map }
}

#[test]
fn diff_detects_added_removed_and_modified() {
    let scout = Agent::builder().name("scout").build();
    let mut scout_v2 = scout.clone();
    scout_v2.max_turns = Some(5);
    let archivist = Agent::builder().name("archivist").build();

    let before = config_with(vec![scout.clone(), archivist]);
    let after = config_with(vec![scout_v2, Agent::builder().name("curator").build()]);

    let diff = before.diff_agent_names(&after);

    assert_eq!(diff.added, vec!["curator".to_string()]);
    assert_eq!(diff.removed, vec!["archivist".to_string()]);
    assert_eq!(diff.modified, vec!["scout".to_string()]);
}

#[test]
fn diff_is_empty_for_identical_configs() {
    let scout = Agent::builder().name("scout").build();
    let before = config_with(vec![scout.clone()]);
    let after = config_with(vec![scout]);

    let diff = before.diff_agent_names(&after);

    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
    assert!(diff.modified.is_empty());
}
