//! Smoke tests for the goalplan binary.
//!
//! Only commands that need no model access run here. Each test gets its own
//! state directory through `GOALPLAN_HOME` and its own working directory so
//! no config file is discovered.

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
    cwd: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            cwd: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("goalplan"));
        cmd.current_dir(self.cwd.path())
            .env("GOALPLAN_HOME", self.home.path())
            .env_remove("GOALPLAN_USER")
            .env_remove("GOALPLAN_LLM_PROVIDER")
            .env_remove("GOALPLAN_MODEL")
            .env_remove("RUST_LOG");
        cmd
    }

    fn create(&self, wish: &str) {
        self.cmd()
            .args(["goal", "create", "--wish", wish, "--outcome", "done"])
            .assert()
            .success();
    }
}

#[test]
fn version_output() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("goalplan"));
}

#[test]
fn create_list_show_delete() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["goal", "create", "--wish", "Learn to sail", "--outcome", "Cross the channel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created goal 1: Learn to sail"));
    sandbox.create("Run a marathon");

    sandbox
        .cmd()
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Learn to sail").and(predicate::str::contains("Run a marathon")));

    sandbox
        .cmd()
        .args(["goal", "show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Goal 2 (new)"));

    sandbox
        .cmd()
        .args(["goal", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted goal 1"));

    sandbox
        .cmd()
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Learn to sail").not());

    assert!(sandbox.home.path().join("users/local/goals/2.json").exists());
}

#[test]
fn json_output_is_machine_readable() {
    let sandbox = Sandbox::new();
    sandbox.create("Learn piano");

    let output = sandbox.cmd().args(["goal", "list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let goals: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(goals[0]["id"], 1);
    assert_eq!(goals[0]["wish"], "Learn piano");
    assert_eq!(goals[0]["user_id"], "local");
}

#[test]
fn goals_are_per_user() {
    let sandbox = Sandbox::new();
    sandbox.create("Learn piano");

    sandbox
        .cmd()
        .args(["goal", "show", "1", "--user", "bob"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Goal 1 does not exist"));

    sandbox
        .cmd()
        .env("GOALPLAN_USER", "bob")
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No goals yet"));
}

#[test]
fn missing_goal_exits_with_not_found() {
    Sandbox::new()
        .cmd()
        .args(["goal", "delete", "42"])
        .assert()
        .code(3)
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn invalid_user_id_is_a_usage_error() {
    Sandbox::new()
        .cmd()
        .args(["goal", "list", "--user", "../etc"])
        .assert()
        .code(2);
}

#[test]
fn plan_before_breakdown_is_a_missing_prerequisite() {
    let sandbox = Sandbox::new();
    sandbox.create("Learn piano");

    sandbox
        .cmd()
        .env("GEMINI_API_KEY", "test-key-not-used")
        .args(["plan", "1"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("generate a goal breakdown first"));
}

#[test]
fn regenerate_without_answers_is_a_missing_prerequisite() {
    let sandbox = Sandbox::new();
    sandbox.create("Learn piano");

    sandbox
        .cmd()
        .env("GEMINI_API_KEY", "test-key-not-used")
        .args(["regenerate", "1", "--phases", "4"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("answer the questions first"));
}

#[test]
fn missing_api_key_is_reported_before_any_call() {
    let sandbox = Sandbox::new();
    sandbox.create("Learn piano");

    sandbox
        .cmd()
        .env_remove("GEMINI_API_KEY")
        .args(["questions", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn unknown_provider_is_rejected() {
    Sandbox::new()
        .cmd()
        .args(["goal", "list", "--provider", "openai"])
        .assert()
        .code(2);
}

#[test]
fn bad_config_file_is_a_usage_error() {
    let sandbox = Sandbox::new();
    let dir = sandbox.cwd.path().join(".goalplan");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[defaults]\nphase_count = \"many\"\n").unwrap();

    sandbox.cmd().args(["goal", "list"]).assert().code(2);
}

#[test]
fn breakdown_with_unreadable_answers_is_a_usage_error() {
    let sandbox = Sandbox::new();
    sandbox.create("Learn piano");

    sandbox
        .cmd()
        .env("GEMINI_API_KEY", "test-key-not-used")
        .args(["breakdown", "1", "--answers", "missing.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.json"));
}
