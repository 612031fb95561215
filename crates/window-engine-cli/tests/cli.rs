use assert_cmd::Command;
use predicates::prelude::*;

fn mirage() -> Command {
    Command::cargo_bin("mirage").unwrap()
}

// ── window ──────────────────────────────────────────────────────────────

#[test]
fn test_window_hourly_negative_offset() {
    mirage()
        .args([
            "window",
            "--preset",
            "hourly",
            "--offset",
            "-2h",
            "--at",
            "2024-01-01T10:37:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("start:    2024-01-01T07:00:00+00:00"))
        .stdout(predicate::str::contains("end:      2024-01-01T08:00:00+00:00"))
        .stdout(predicate::str::contains("duration: 1 hour"));
}

#[test]
fn test_window_monthly_json() {
    let output = mirage()
        .args([
            "window",
            "--preset",
            "monthly",
            "--size",
            "60d",
            "--at",
            "2024-03-15",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["start"], "2024-02-01T00:00:00+00:00");
    assert_eq!(value["end"], "2024-03-31T00:00:00+00:00");
    assert_eq!(value["duration"], "59 days");
    assert_eq!(value["size"], "1440h");
    assert_eq!(value["truncate_to"], "M");
}

#[test]
fn test_window_weekly_ends_on_sunday() {
    mirage()
        .args(["window", "--preset", "weekly", "--at", "2024-03-13T15:30:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("end:      2024-03-17T00:00:00+00:00"))
        .stdout(predicate::str::contains("duration: 7 days"));
}

#[test]
fn test_window_truncate_override() {
    mirage()
        .args([
            "window",
            "--preset",
            "daily",
            "--truncate",
            "none",
            "--at",
            "2024-05-06T13:14:15Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("end:      2024-05-06T13:14:15+00:00"));
}

#[test]
fn test_window_unknown_truncate_tag_fails() {
    mirage()
        .args(["window", "--truncate", "m", "--at", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid granularity"));
}

#[test]
fn test_window_negative_size_fails() {
    mirage()
        .args(["window", "--size", "-1h", "--at", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("size must not be negative"));
}

#[test]
fn test_window_bad_reference_fails() {
    mirage()
        .args(["window", "--at", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --at"));
}

// ── create ──────────────────────────────────────────────────────────────

#[test]
fn test_create_scheduled_to_stdout() {
    let output = mirage()
        .args([
            "create",
            "--name",
            "sales-daily",
            "--owner",
            "data@example.com",
            "--start-date",
            "2024-01-01",
            "--cron",
            "0 2 * * *",
            "--preset",
            "daily",
            "--offset",
            "-1h",
            "--task",
            "bq2bq",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "sales-daily");
    assert_eq!(value["trigger"], "scheduled");
    assert_eq!(value["schedule"]["start_date"], "2024-01-01");
    assert_eq!(value["schedule"]["interval"], "0 2 * * *");
    assert_eq!(value["task"], "bq2bq");
    assert_eq!(value["window"]["size"], "24h");
    assert_eq!(value["window"]["offset"], "-1h");
    assert_eq!(value["window"]["truncate_to"], "d");
}

#[test]
fn test_create_manual_to_file() {
    let path = std::env::temp_dir().join(format!("mirage-cli-test-{}.json", std::process::id()));
    mirage()
        .args([
            "create",
            "--name",
            "adhoc",
            "--owner",
            "me",
            "--trigger",
            "manual",
            "--task",
            "python",
            "--output",
        ])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Your job has been created"));

    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["trigger"], "manual");
    assert!(value.get("schedule").is_none());
    assert_eq!(value["window"]["truncate_to"], "h");
}

#[test]
fn test_create_scheduled_requires_cron() {
    mirage()
        .args([
            "create", "--name", "x", "--owner", "y", "--task", "python",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cron is required"));
}

#[test]
fn test_create_rejects_old_start_date() {
    mirage()
        .args([
            "create",
            "--name",
            "x",
            "--owner",
            "y",
            "--start-date",
            "1999-06-01",
            "--cron",
            "@daily",
            "--task",
            "python",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("before 2000"));
}

#[test]
fn test_create_unknown_task_fails() {
    mirage()
        .args([
            "create", "--name", "x", "--owner", "y", "--trigger", "manual", "--task", "spark",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown task"));
}
