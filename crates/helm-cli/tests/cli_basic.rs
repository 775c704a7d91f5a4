//! Basic CLI E2E tests.
//!
//! Each test runs the built `helm` binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_helm"))
        .args(args)
        .env("HELM_DATA_DIR", data_dir)
        .env("HELM_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn created_id(stdout: &str) -> String {
    stdout
        .trim()
        .strip_prefix("Item created: ")
        .expect("unexpected add output")
        .to_string()
}

#[test]
fn test_config_defaults_and_set() {
    let dir = tempfile::tempdir().unwrap();

    let (out, _, code) = run_cli(dir.path(), &["config", "get", "timer.focus_duration"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "25");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.break_duration", "10"]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(dir.path(), &["config", "get", "timer.break_duration"]);
    assert_eq!(out.trim(), "10");

    let (_, err, code) = run_cli(dir.path(), &["config", "set", "poller.interval_ms", "0"]);
    assert_eq!(code, 1);
    assert!(err.contains("error:"));
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, err, code) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(err.contains("unknown key"));
}

#[test]
fn test_item_add_list_done_remove() {
    let dir = tempfile::tempdir().unwrap();

    let (out, _, code) = run_cli(
        dir.path(),
        &["item", "add", "Write report +work", "--date", "2024-05-10", "--time", "14:00"],
    );
    assert_eq!(code, 0);
    let id = created_id(&out);

    let (out, _, code) = run_cli(dir.path(), &["item", "list", "--date", "2024-05-10"]);
    assert_eq!(code, 0);
    assert!(out.contains("[task] Write report +WORK"));
    assert!(out.contains("14:00"));

    let (_, _, code) = run_cli(dir.path(), &["item", "done", &id]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(dir.path(), &["item", "list", "--date", "2024-05-10"]);
    assert!(out.contains("[done] Write report"));

    let (_, _, code) = run_cli(dir.path(), &["item", "remove", &id]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(dir.path(), &["item", "list", "--date", "2024-05-10"]);
    assert!(out.contains("nothing scheduled"));

    let (_, err, code) = run_cli(dir.path(), &["item", "remove", &id]);
    assert_eq!(code, 1);
    assert!(err.contains("not found"));
}

#[test]
fn test_weekly_event_lists_on_each_matching_day() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        dir.path(),
        &[
            "item", "add", "Lecture", "--event", "--date", "2024-03-04", "--time", "09:00",
            "--end", "12:00", "--weekly", "--from", "2024-03-01", "--until", "2024-03-31",
        ],
    );
    assert_eq!(code, 0);

    let (out, _, code) = run_cli(
        dir.path(),
        &["item", "list", "--date", "2024-02-26", "--days", "42", "--json"],
    );
    assert_eq!(code, 0);
    let rows: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    let days: Vec<_> = rows.iter().map(|r| r["day"].as_str().unwrap().to_string()).collect();
    assert_eq!(days, ["2024-03-04", "2024-03-11", "2024-03-18", "2024-03-25"]);
    assert_eq!(rows[0]["item"]["dayOfWeek"], 1);
    assert_eq!(rows[0]["item"]["endTime"], "12:00");
}

#[test]
fn test_poll_marks_due_reminder_once() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "notifications.enabled", "false"]);
    let (out, _, code) = run_cli(
        dir.path(),
        &["item", "add", "Old reminder", "--date", "2020-01-01", "--time", "09:00", "--remind", "0"],
    );
    assert_eq!(code, 0);
    let id = created_id(&out);

    let (out, _, code) = run_cli(dir.path(), &["poll"]);
    assert_eq!(code, 0);
    let events: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "ReminderSent");
    assert_eq!(events[0]["item_id"].to_string(), id);
    assert_eq!(events[1]["type"], "ItemsChanged");

    let (out, _, code) = run_cli(dir.path(), &["poll"]);
    assert_eq!(code, 0);
    assert!(out.trim().is_empty());
}
