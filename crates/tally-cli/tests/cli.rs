use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "Txn Date,Narration,Debit,Credit\n\
    2026-02-01,Salary credit,0,50000\n\
    2026-02-02,Swiggy order,450,0\n\
    2026-02-03,Uber ride,230.50,\n";

fn tally(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    // Keep the user's real config out of the test.
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir.join("config"));
    cmd
}

#[test]
fn import_csv_then_list() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("statement.csv");
    let store = dir.path().join("tx.jsonl");
    fs::write(&input, STATEMENT).unwrap();

    tally(dir.path())
        .args(["import", input.to_str().unwrap(), "--owner", "u1", "--store", store.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 3 transactions from statement.csv"));

    tally(dir.path())
        .args(["list", "--owner", "u1", "--store", store.to_str().unwrap(), "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Salary credit"))
        .stdout(predicate::str::contains("Income"))
        .stdout(predicate::str::contains("Transport"));
}

#[test]
fn import_json_report() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("statement.csv");
    fs::write(&input, STATEMENT).unwrap();

    let output = tally(dir.path())
        .args(["import", input.to_str().unwrap(), "--owner", "u1", "--dry-run", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["message"], "Success");
    assert_eq!(report["records"], 3);
    assert!(!dir.path().join("transactions.jsonl").exists());
}

#[test]
fn unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "2026-01-01 Zomato 250").unwrap();

    tally(dir.path())
        .args(["import", input.to_str().unwrap(), "--owner", "u1", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file type: .txt"));
}

#[test]
fn missing_amount_column_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "Date,Description\n2026-01-01,Coffee\n").unwrap();

    tally(dir.path())
        .args(["import", input.to_str().unwrap(), "--owner", "u1", "--dry-run"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("could not identify amount column"));
}

#[test]
fn add_manual_entry() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tx.jsonl");

    tally(dir.path())
        .args([
            "add", "--owner", "u1", "--amount", "₹1,250.75", "--category", "Food", "--direction", "debit",
            "--description", "Team lunch", "--store", store.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1250.75"));

    let content = fs::read_to_string(&store).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("Team lunch"));
}

#[test]
fn batch_writes_summary() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("jan.csv"), STATEMENT).unwrap();
    fs::write(dir.path().join("feb.csv"), "Amount\n0\n").unwrap();
    let summary = dir.path().join("summary.csv");
    let store = dir.path().join("tx.jsonl");
    let pattern = dir.path().join("*.csv");

    tally(dir.path())
        .args([
            "batch", pattern.to_str().unwrap(), "--owner", "u1", "--store", store.to_str().unwrap(),
            "--summary", summary.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 transactions from 2 files"));

    let summary = fs::read_to_string(summary).unwrap();
    assert!(summary.starts_with("filename,status,records,errors,processing_time_ms"));
    assert!(summary.contains("jan.csv,Success,3"));
}

#[test]
fn config_get_default() {
    let dir = TempDir::new().unwrap();

    tally(dir.path())
        .args(["config", "get", "pdf.min_text_length"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50"));
}
