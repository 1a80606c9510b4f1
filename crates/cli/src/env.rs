// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared environment/path conventions for both binaries (§6.4).

use std::path::PathBuf;

/// Default state directory, used when neither `--state-dir` nor
/// `fleet.state_dir` in the config supplies one.
pub fn default_state_dir() -> PathBuf {
    dirs_state_dir().unwrap_or_else(|| PathBuf::from(".herdctl"))
}

fn dirs_state_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".herdctl"))
}

/// The control socket the daemon listens on and the CLI connects to, one per
/// state directory so multiple fleets never collide.
pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("herdctl.sock")
}

/// Resolve the effective log level from `--log-level`, `HERDCTL_LOG_LEVEL`,
/// and the `DEBUG` override, in that priority order (§6.4).
pub fn resolve_log_level(flag: Option<&str>) -> String {
    if let Ok(debug) = std::env::var("DEBUG") {
        if debug == "1" || debug.eq_ignore_ascii_case("true") {
            return "debug".to_string();
        }
    }
    if let Some(level) = flag {
        return level.to_string();
    }
    std::env::var("HERDCTL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn flag_wins_over_env_wins_over_default() {
        std::env::remove_var("DEBUG");
        std::env::remove_var("HERDCTL_LOG_LEVEL");
        assert_eq!(resolve_log_level(None), "info");

        std::env::set_var("HERDCTL_LOG_LEVEL", "warn");
        assert_eq!(resolve_log_level(None), "warn");
        assert_eq!(resolve_log_level(Some("error")), "error");

        std::env::set_var("DEBUG", "1");
        assert_eq!(resolve_log_level(Some("error")), "debug");
        std::env::remove_var("DEBUG");
        std::env::remove_var("HERDCTL_LOG_LEVEL");
    }
}
