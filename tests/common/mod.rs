//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Environment variables that would leak host configuration into a test run
const PANEL_ENV: &[&str] = &[
    "PERSONA_INTERACT_CONFIG",
    "PERSONA_INTERACT_BACKEND_URL",
    "PERSONA_INTERACT_TOKEN",
    "PERSONA_INTERACT_TIMEOUT_SECS",
    "PERSONA_INTERACT_AGENT_ID",
    "PERSONA_INTERACT_ACTION_ID",
    "PERSONA_INTERACT_PER_PAGE",
    "PERSONA_INTERACT_LOG_LEVEL",
    "PERSONA_INTERACT_LOG_FILE",
    "PERSONA_INTERACT_LOG_JSON",
    "RUST_LOG",
];

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Command for the panel binary isolated from the host's config and env.
///
/// `home` becomes HOME, XDG_CONFIG_HOME and the working directory so the
/// config search path finds nothing unless the test puts it there.
pub fn panel_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("persona-interact").unwrap();
    for var in PANEL_ENV {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .current_dir(home);
    cmd
}

/// Write a panel config pointing at `backend_url` and return its path
pub fn write_panel_config(dir: &Path, backend_url: &str) -> PathBuf {
    let path = dir.join("panel.toml");
    let content = format!(
        r#"
[backend]
url = "{}"
token = "secret"
timeout_secs = 5

[session]
agent_id = "agent-1"
action_id = "act-1"
per_page = 2
"#,
        backend_url
    );
    fs::write(&path, content).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_valid_config_exists() {
        assert!(
            valid_config_fixture().exists(),
            "Valid config fixture should exist"
        );
    }

    #[test]
    fn test_invalid_config_exists() {
        assert!(
            invalid_config_fixture().exists(),
            "Invalid config fixture should exist"
        );
    }
}
