//! Smoke tests -- verify the binary runs and the dry-run paths work offline.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("app-status").unwrap();
    cmd.env_remove("BLYNK_AUTH")
        .env("APP_STATUS_CONFIG", "/nonexistent/app-status.toml");
    cmd
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Blynk mobile dashboard"));
}

#[test]
fn test_cli_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("app-status"));
}

#[test]
fn test_missing_token_fails() {
    cli()
        .args(["stop", "--run", "0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("no auth token"));
}

#[test]
fn test_dry_run_push() {
    cli()
        .args(["--dry-run", "push", "0=Nightly", "V5=255"])
        .assert()
        .success()
        .stdout(predicates::str::contains("V0 = Nightly"))
        .stdout(predicates::str::contains("V5 = 255"));
}

#[test]
fn test_dry_run_push_rejects_malformed_write() {
    cli()
        .args(["--dry-run", "push", "nonsense"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("PIN=VALUE"));
}

#[test]
fn test_dry_run_stop() {
    cli()
        .args(["--dry-run", "stop", "--run", "2"])
        .assert()
        .success()
        .stdout(predicates::str::contains("V25 = 0"));
}

#[test]
fn test_dry_run_simulate_json() {
    cli()
        .args([
            "--dry-run",
            "simulate",
            "--totals",
            "3,2",
            "--period-ms",
            "0",
            "--seed",
            "1",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicates::str::contains("\"name\": \"Run 1\""))
        .stdout(predicates::str::contains("\"completed\": 3"));
}

#[test]
fn test_dry_run_stop_rejects_run_outside_pin_space() {
    cli()
        .args(["--dry-run", "stop", "--run", "65536"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("out of range"))
        .stdout(predicates::str::contains("V5 = 0").not());
}

#[test]
fn test_invalid_config_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tracker]\nrun_slots = 0").unwrap();

    cli()
        .env("APP_STATUS_CONFIG", file.path())
        .args(["--dry-run", "stop", "--run", "1"])
        .assert()
        .success()
        .stderr(predicates::str::contains("config file could not be loaded"))
        .stderr(predicates::str::contains("run_slots"))
        .stdout(predicates::str::contains("V15 = 0"));
}
