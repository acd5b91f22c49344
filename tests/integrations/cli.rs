//! Runs the compiled binary's one-shot subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const MEMBERS: &str = r#"{
  "household-1": [
    { "uid": "1", "displayName": "Alice", "fcmTokens": ["t1", "t2"] },
    { "uid": "2", "displayName": "Bob", "fcmTokens": ["t3"] }
  ]
}"#;

fn members_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", MEMBERS).unwrap();
    file
}

fn household_notify() -> Command {
    let mut cmd = Command::cargo_bin("household-notify").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_contribution_subcommand_prints_summary() {
    let members = members_file();

    household_notify()
        .arg("--members")
        .arg(members.path())
        .arg("--dry-run")
        .args([
            "contribution",
            "--household",
            "household-1",
            "--id",
            "c1",
            "--by",
            "1",
            "--by-display-name",
            "Alice",
            "--amount",
            "150.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"successCount":1,"failureCount":0}"#,
        ))
        .stderr(predicate::str::contains("Push notification (dry run)"));
}

#[test]
fn test_close_month_requires_caller() {
    let members = members_file();

    household_notify()
        .arg("--members")
        .arg(members.path())
        .args([
            "close-month",
            "--household",
            "household-1",
            "--month",
            "2024-05",
            "--carry-over",
            "-25",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User must be authenticated"));
}

#[test]
fn test_close_month_with_caller_prints_response() {
    let members = members_file();

    household_notify()
        .arg("--members")
        .arg(members.path())
        .args([
            "close-month",
            "--household",
            "household-1",
            "--month",
            "2024-05",
            "--carry-over",
            "-25",
            "--caller-uid",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"success":true,"sentCount":3}"#));
}

#[test]
fn test_missing_members_snapshot_fails() {
    household_notify()
        .args([
            "expense",
            "--household",
            "household-1",
            "--id",
            "e1",
            "--by",
            "2",
            "--by-display-name",
            "Bob",
            "--amount",
            "80",
            "--category-id",
            "cat-1",
            "--category-name",
            "Comida",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("store.members_path is required"));
}
