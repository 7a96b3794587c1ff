//! Tests of the `sitecost` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ACTIVITIES: &str = r#"[
  {"_id": "steel-in", "user": {"_id": "u1", "fullName": "Ravi Kumar"}, "projectId": "p1",
   "projectName": "Riverside Towers", "activity": "imported", "date": "2023-06-15T09:00:00Z",
   "materials": [{"name": "Steel", "unit": "kg", "quantity": 100, "perUnitCost": 65}]},
  {"_id": "cement-in", "user": {"_id": "u1", "fullName": "Ravi Kumar"}, "projectId": "p1",
   "activity": "imported", "date": "2023-06-15T10:00:00Z",
   "materials": [{"name": "Cement", "unit": "bags", "qnt": 20, "cost": 400}]},
  {"_id": "steel-out", "user": {"_id": "u2", "fullName": "Anita Rao"}, "projectId": "p1",
   "activity": "used", "date": "2023-06-15T15:00:00Z",
   "materials": [{"name": "Steel", "unit": "kg", "qnt": 30, "cost": 1950}]}
]"#;

const LABOR: &str = r#"{"labor": [{"category": "Mason", "type": "skilled", "count": 5, "perLaborCost": 800}]}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("activities.json"), ACTIVITIES).unwrap();
        fs::write(dir.path().join("labor.json"), LABOR).unwrap();
        // UTC days regardless of the host timezone
        fs::write(
            dir.path().join("config.json"),
            r#"{"utc_offset_minutes": 0, "company": {"name": "Acme Builders"}}"#,
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sitecost").unwrap();
        cmd.env("SITECOST_CONFIG_DIR", self.dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn report_prints_terminal_output() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["report", "--activities", arg(&fx.path("activities.json"))])
        .args(["--labor", arg(&fx.path("labor.json"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Builders"))
        .stdout(predicate::str::contains("Project: Riverside Towers"))
        .stdout(predicate::str::contains("$14500.00"))
        .stdout(predicate::str::contains("$18500.00"));
}

#[test]
fn report_writes_json_file() {
    let fx = Fixture::new();
    let output = fx.path("report.json");
    fx.cmd()
        .args(["report", "--activities", arg(&fx.path("activities.json"))])
        .args(["--labor", arg(&fx.path("labor.json"))])
        .args(["--format", "json", "--output", arg(&output)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report exported to"));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(value["report"]["summary"]["total_project_cost"], "18500");
    assert_eq!(value["report"]["header"]["company"]["name"], "Acme Builders");
}

#[test]
fn report_csv_to_stdout() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["report", "--activities", arg(&fx.path("activities.json")), "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Section,Date,Activity"))
        .stdout(predicate::str::contains("total,,,,,Material Total,,,,,14500.00,"));
}

#[test]
fn stats_prints_summary_json() {
    let fx = Fixture::new();
    let assert = fx
        .cmd()
        .args(["stats", "--activities", arg(&fx.path("activities.json"))])
        .args(["--labor", arg(&fx.path("labor.json"))])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["total_activities"], 3);
    assert_eq!(value["day_count"], 1);
    assert_eq!(value["total_labor_cost"], "4000");
}

#[test]
fn invalid_record_fails_without_best_effort() {
    let fx = Fixture::new();
    let bad = fx.path("bad.json");
    fs::write(
        &bad,
        r#"[{"_id": "bad", "user": {"_id": "u1"}, "projectId": "p1", "activity": "imported",
             "date": "2023-06-15T09:00:00Z", "materials": [{"name": "Steel", "quantity": 0, "totalCost": 500}]},
            {"_id": "good", "user": {"_id": "u1"}, "projectId": "p1", "activity": "imported",
             "date": "2023-06-15T09:00:00Z", "materials": [{"name": "Sand", "qnt": 2, "cost": 10}]}]"#,
    )
    .unwrap();

    fx.cmd()
        .args(["report", "--activities", arg(&bad)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity in bad"));

    fx.cmd()
        .args(["report", "--activities", arg(&bad), "--best-effort"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped records (2)"))
        .stdout(predicate::str::contains("$20.00"));
}

#[test]
fn bad_date_filter_is_rejected() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["report", "--activities", arg(&fx.path("activities.json")), "--from", "June 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid start date format"));
}

#[test]
fn missing_input_file_is_reported() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["report", "--activities", arg(&fx.path("nope.json"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn init_writes_settings_once() {
    let dir = TempDir::new().unwrap();
    let run = || {
        let mut cmd = Command::cargo_bin("sitecost").unwrap();
        cmd.env("SITECOST_CONFIG_DIR", dir.path()).arg("init");
        cmd
    };

    run().assert()
        .success()
        .stdout(predicate::str::contains("Settings written to"));
    assert!(dir.path().join("config.json").exists());

    run().assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn config_shows_paths() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config directory"))
        .stdout(predicate::str::contains("Acme Builders"))
        .stdout(predicate::str::contains("UTC offset:        0 minutes"));
}

#[test]
fn badly_typed_record_is_skipped_with_best_effort() {
    let fx = Fixture::new();
    let typo = fx.path("typo.json");
    fs::write(
        &typo,
        r#"[{"_id": "typo", "user": {"_id": "u1"}, "projectId": "p1", "activity": "imported",
             "date": "2023-06-15T09:00:00Z", "materials": [{"name": "Steel", "qnt": "ten", "cost": 65}]},
            {"_id": "good", "user": {"_id": "u1"}, "projectId": "p1", "activity": "imported",
             "date": "2023-06-15T09:00:00Z", "materials": [{"name": "Sand", "qnt": 2, "cost": 10}]}]"#,
    )
    .unwrap();

    fx.cmd()
        .args(["report", "--activities", arg(&typo)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed record typo (materials[0].qnt)"));

    fx.cmd()
        .args(["report", "--activities", arg(&typo), "--best-effort"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped records (1)"))
        .stdout(predicate::str::contains("$20.00"));
}

#[test]
fn unusable_date_format_is_a_config_error() {
    let fx = Fixture::new();
    fs::write(
        fx.path("config.json"),
        r#"{"utc_offset_minutes": 0, "date_format": "%Q"}"#,
    )
    .unwrap();

    fx.cmd()
        .args(["report", "--activities", arg(&fx.path("activities.json"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("date_format '%Q'"));
}
