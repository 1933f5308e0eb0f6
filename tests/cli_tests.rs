//! Binary-level tests for the `streamwatch` CLI.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;

use support::config::{write_temp_config, LOG_ONLY_TOML};

fn streamwatch() -> Command {
    let mut cmd = Command::cargo_bin("streamwatch").expect("binary builds");
    cmd.env_remove("RUST_LOG").env_remove("TELEGRAM_BOT_TOKEN");
    cmd
}

#[test]
fn check_accepts_valid_config() {
    let file = write_temp_config(LOG_ONLY_TOML);

    streamwatch()
        .arg("--config")
        .arg(file.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn check_lists_warnings() {
    let file = write_temp_config(
        r#"
        [channels.log]
        Alerts = "all,raids"

        [entities.alice]
        "#,
    );

    streamwatch()
        .arg("--config")
        .arg(file.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unrecognized keyword").and(predicate::str::contains("raids")));
}

#[test]
fn check_fails_on_missing_required_field() {
    let file = write_temp_config(
        r#"
        [dispatcher]
        channels = ["discord"]

        [channels.discord]
        Alerts = "live"
        "Webhook URL" = "https://discord.example/a"

        [entities.alice]
        "#,
    );

    streamwatch()
        .arg("--config")
        .arg(file.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Message Text"));
}

#[test]
fn missing_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();

    streamwatch()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn send_reports_per_channel_outcome() {
    let file = write_temp_config(LOG_ONLY_TOML);

    streamwatch()
        .arg("--config")
        .arg(file.path())
        .args(["send", "alice", "live", "--title", "Speedrun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("log").and(predicate::str::contains("sent")));
}

#[test]
fn send_rejects_unknown_event() {
    let file = write_temp_config(LOG_ONLY_TOML);

    streamwatch()
        .arg("--config")
        .arg(file.path())
        .args(["send", "alice", "raid"])
        .assert()
        .failure();
}

#[test]
fn run_delivers_stdin_alerts_until_eof() {
    let file = write_temp_config(LOG_ONLY_TOML);

    streamwatch()
        .arg("--config")
        .arg(file.path())
        .arg("run")
        .env("RUST_LOG", "streamwatch::alert=info")
        .write_stdin("# warm up\ntitle alice Speedrun\nalert alice live\nbogus line\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice live"));
}
