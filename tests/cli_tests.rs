//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{invalid_config_fixture, panel_cmd, valid_config_fixture};

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Persona Interact"))
        .stdout(predicate::str::contains("params"))
        .stdout(predicate::str::contains("formats"))
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_params_help() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["params", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("purge"));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("persona-interact"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Git Hash"))
        .stdout(predicate::str::contains("Target"));
}

#[test]
fn test_short_version_flag() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("persona-interact"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_default() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[backend]"))
        .stdout(predicate::str::contains("[session]"))
        .stdout(predicate::str::contains("[logging]"))
        .stdout(predicate::str::contains("http://localhost:8000"));
}

#[test]
fn test_config_show_fixture() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["config", "show", "--config"])
        .arg(valid_config_fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("agent-fixture"))
        .stdout(predicate::str::contains("per_page = 5"));
}

#[test]
fn test_config_validate_default() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_invalid_fixture() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["config", "validate", "--config"])
        .arg(invalid_config_fixture())
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("E102"));
}

#[test]
fn test_config_validate_nonexistent_file() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["config", "validate", "--config", "/nonexistent/path/config.toml"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_config_init_writes_file() {
    let home = TempDir::new().unwrap();
    let target = home.path().join("nested").join("panel.toml");

    panel_cmd(home.path())
        .args(["config", "init", "--path"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(target.exists());

    // Second run refuses to overwrite without --force
    panel_cmd(home.path())
        .args(["config", "init", "--path"])
        .arg(&target)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    panel_cmd(home.path())
        .args(["config", "init", "--force", "--path"])
        .arg(&target)
        .assert()
        .success();
}

#[test]
fn test_config_found_in_working_directory() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("persona-interact.toml"),
        "[session]\nagent_id = \"from-cwd\"\n",
    )
    .unwrap();

    panel_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-cwd"));
}

// ─────────────────────────────────────────────────────────────────
// Panel Command Argument Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_panel_command_requires_agent_id() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["params", "list"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("agent_id is required"))
        .stderr(predicate::str::contains("--agent-id"));
}

#[test]
fn test_formats_require_action_id() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["--agent-id", "agent-1", "formats", "list"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("action_id is required"));
}

#[test]
fn test_page_zero_rejected_locally() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["--agent-id", "agent-1", "params", "list", "--page", "0"])
        .env("PERSONA_INTERACT_BACKEND_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .code(90)
        .stderr(predicate::str::contains("page and per_page must be at least 1"));
}

#[test]
fn test_edit_without_fields_rejected() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["--agent-id", "agent-1", "params", "edit", "p1"])
        .assert()
        .failure()
        .code(90)
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_import_requires_one_source() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["--agent-id", "agent-1", "params", "import"])
        .assert()
        .failure();

    panel_cmd(home.path())
        .args(["--agent-id", "agent-1", "params", "import", "--text", "a: 1", "--file", "x.yaml"])
        .assert()
        .failure();
}

#[test]
fn test_unreachable_backend_exit_code() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .args(["--agent-id", "agent-1", "params", "list"])
        .env("PERSONA_INTERACT_BACKEND_URL", "http://127.0.0.1:9")
        .env("PERSONA_INTERACT_TIMEOUT_SECS", "2")
        .assert()
        .failure()
        .code(30)
        .stderr(predicate::str::contains("Backend unreachable"));
}

// ─────────────────────────────────────────────────────────────────
// Verbosity Flag Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_flag() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path()).args(["-v", "version"]).assert().success();
}

#[test]
fn test_quiet_flag() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path()).args(["--quiet", "version"]).assert().success();
}

// ─────────────────────────────────────────────────────────────────
// Error Handling Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_command() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path())
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_subcommand() {
    let home = TempDir::new().unwrap();
    panel_cmd(home.path()).assert().failure();
}
