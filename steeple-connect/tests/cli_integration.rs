//! CLI integration tests for steeple-connect
//!
//! Runs the real binary against a temporary config and database. URL
//! building and state validation are fully offline, so none of these tests
//! reach a platform API.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_env() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let db_path = temp_dir.path().join("steeplecast.db");

    let config_content = format!(
        r#"
[database]
path = "{}"

[oauth]
redirect_origin = "http://localhost:5173"

[facebook]
app_id = "fb-app-id"
app_secret = "fb-app-secret"
"#,
        db_path.display()
    );
    fs::write(&config_path, config_content).unwrap();

    (temp_dir, config_path.to_string_lossy().to_string())
}

fn base_cmd(config_path: &str) -> Command {
    let mut cmd = Command::cargo_bin("steeple-connect").unwrap();
    cmd.env("STEEPLECAST_CONFIG", config_path)
        .env("STEEPLECAST_USER", "user-1")
        .env("STEEPLECAST_TOKEN", "token-abc")
        .env("STEEPLECAST_CHURCH", "church-1");
    cmd
}

#[test]
fn test_list_shows_every_platform_disconnected() {
    let (_guard, config_path) = setup_env();

    base_cmd(&config_path)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("facebook"))
        .stdout(predicate::str::contains("instagram"))
        .stdout(predicate::str::contains("youtube"))
        .stdout(predicate::str::contains("tiktok"))
        .stdout(predicate::str::contains("not connected"));
}

#[test]
fn test_url_prints_authorization_url() {
    let (_guard, config_path) = setup_env();

    base_cmd(&config_path)
        .args(["url", "facebook"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://www.facebook.com/v19.0/dialog/oauth",
        ))
        .stdout(predicate::str::contains("client_id=fb-app-id"))
        .stdout(predicate::str::contains("state=facebook_"));
}

#[test]
fn test_url_without_credentials_fails() {
    let (_guard, config_path) = setup_env();

    // YouTube credentials are not configured
    base_cmd(&config_path)
        .args(["url", "youtube"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No client credentials"));
}

#[test]
fn test_callback_with_bogus_state_is_rejected() {
    let (_guard, config_path) = setup_env();

    base_cmd(&config_path)
        .args([
            "callback",
            "facebook",
            "--code",
            "AQDfake",
            "--state",
            "facebook_bogus",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("state mismatch"));
}

#[test]
fn test_callback_for_other_user_is_unauthorized() {
    let (_guard, config_path) = setup_env();

    base_cmd(&config_path)
        .args([
            "callback",
            "facebook",
            "--code",
            "AQDfake",
            "--state",
            "facebook_bogus",
            "--user",
            "someone-else",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("user id mismatch"));
}

#[test]
fn test_disconnect_is_idempotent() {
    let (_guard, config_path) = setup_env();

    base_cmd(&config_path)
        .args(["disconnect", "facebook"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Disconnected facebook"));

    base_cmd(&config_path)
        .args(["disconnect", "facebook"])
        .assert()
        .success();
}

#[test]
fn test_list_json_output() {
    let (_guard, config_path) = setup_env();

    let output = base_cmd(&config_path).args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e["connected"] == false));
}
