//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own config directory.

use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_roundclock"))
        .args(args)
        .env("ROUNDCLOCK_HOME", home.path())
        .env_remove("ROUNDCLOCK_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn home() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

#[test]
fn test_plan_zero_rest() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["plan", "--work", "20", "--rest", "0", "--rounds", "2"]);
    assert_eq!(code, 0);

    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(plan["total_seconds"], 43);
    let phases: Vec<&str> = plan["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["phase"].as_str().unwrap())
        .collect();
    assert_eq!(phases, vec!["prep", "work", "rest", "work"]);
    assert_eq!(plan["segments"][2]["seconds"], 0);
}

#[test]
fn test_plan_uses_config_defaults() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["plan"]);
    assert_eq!(code, 0);
    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(plan["config"]["work_seconds"], 30);
    assert_eq!(plan["total_seconds"], 3 + 30 * 3 + 15 * 2);
}

#[test]
fn test_plan_rejects_zero_rounds() {
    let home = home();
    let (_, stderr, code) = run_cli(&home, &["plan", "--rounds", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("total_rounds"), "stderr: {stderr}");
}

#[test]
fn test_config_set_then_get() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["config", "set", "session.work_seconds", "45"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(&home, &["config", "get", "session.work_seconds"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");

    let (stdout, _, _) = run_cli(&home, &["plan"]);
    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(plan["config"]["work_seconds"], 45);
}

#[test]
fn test_config_rejects_bad_values() {
    let home = home();
    let (_, stderr, code) = run_cli(&home, &["config", "set", "session.total_rounds", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");

    let (_, _, code) = run_cli(&home, &["config", "get", "session.tempo"]);
    assert_eq!(code, 1);

    let (stdout, _, _) = run_cli(&home, &["config", "get", "session.total_rounds"]);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_config_reset_and_path() {
    let home = home();
    run_cli(&home, &["config", "set", "cues.volume", "10"]);
    let (_, _, code) = run_cli(&home, &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&home, &["config", "get", "cues.volume"]);
    assert_eq!(stdout.trim(), "50");

    let (stdout, _, code) = run_cli(&home, &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_list_is_json() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    let config: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["session"]["rest_seconds"], 15);
    assert_eq!(config["cues"]["vibration"], true);
}

#[test]
fn test_cue_prints_tones() {
    let home = home();
    let (stdout, _, code) = run_cli(&home, &["cue", "finish"]);
    assert_eq!(code, 0);
    let tones: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tones.as_array().unwrap().len(), 2);
    let offset = tones[1]["offset_seconds"].as_f64().unwrap();
    assert!((offset - 0.3).abs() < 1e-6);

    let (_, _, code) = run_cli(&home, &["cue", "siren"]);
    assert_ne!(code, 0);
}

#[test]
fn test_run_json_to_completion() {
    let home = home();
    let (stdout, _, code) = run_cli(
        &home,
        &["run", "--work", "1", "--rest", "0", "--rounds", "1", "--no-sound", "--json"],
    );
    assert_eq!(code, 0);

    let types: Vec<String> = stdout
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).unwrap();
            event["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        types,
        vec![
            "SessionConfigured",
            "SessionStarted",
            "PhaseChanged",
            "PhaseChanged",
            "SessionFinished"
        ]
    );
}
