//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against an isolated data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with an isolated data dir and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focusgate-cli", "--quiet", "--"])
        .args(args)
        .env("FOCUSGATE_DATA_DIR", data_dir)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_config_path_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("config.toml"));

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "start_offset_minutes", "-5"]);
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(dir.path(), &["config", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("start_offset_minutes = -5"));
}

#[test]
fn test_state_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["state", "show"]);
    assert_eq!(code, 0);
    let state: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(state["owns_actuator"], serde_json::json!(false));
}

#[test]
fn test_skip_set_show_clear() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(
        dir.path(),
        &[
            "skip",
            "set",
            "--event-id",
            "42",
            "--begin",
            "2026-08-24T10:00:00Z",
            "--end",
            "2026-08-24T11:00:00Z",
        ],
    );
    assert_eq!(code, 0, "skip set failed: {stderr}");

    let (code, stdout, _) = run_cli(dir.path(), &["skip", "show"]);
    assert_eq!(code, 0);
    let skip: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(skip["event_id"], serde_json::json!(42));

    let (code, _, _) = run_cli(dir.path(), &["skip", "clear"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["skip", "show"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_windows_merges_events_file() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.json");
    std::fs::write(
        &events,
        r#"[
            {"event_id": 1, "calendar_id": 1, "title": "a",
             "begin": "2026-08-24T10:00:00Z", "end": "2026-08-24T11:00:00Z"},
            {"event_id": 2, "calendar_id": 1, "title": "b",
             "begin": "2026-08-24T11:00:00Z", "end": "2026-08-24T12:00:00Z"}
        ]"#,
    )
    .unwrap();

    let (code, stdout, _) = run_cli(
        dir.path(),
        &["windows", "--events", events.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    let windows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(windows.as_array().unwrap().len(), 1);
}

#[test]
fn test_evaluate_snapshot_enables_during_meeting() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    std::fs::write(
        &snapshot,
        r#"{
            "trigger": "alarm",
            "now": "2026-08-24T10:30:00Z",
            "system": {
                "calendar_access": true, "actuator_access": true,
                "precise_timers": true, "actuator_on": false,
                "actuator_mode": "off"
            },
            "calendar": {
                "instances": [
                    {"event_id": 1, "calendar_id": 1, "title": "standup",
                     "begin": "2026-08-24T10:00:00Z", "end": "2026-08-24T11:00:00Z"}
                ]
            }
        }"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &["evaluate", "--snapshot", snapshot.to_str().unwrap(), "--apply"],
    );
    assert_eq!(code, 0, "evaluate failed: {stderr}");
    let evaluation: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(evaluation["decision"]["enable_dnd"], serde_json::json!(true));

    // Ownership was persisted by --apply.
    let (_, stdout, _) = run_cli(dir.path(), &["state", "show"]);
    let state: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(state["owns_actuator"], serde_json::json!(true));
}
