//! Integration tests for the `backdesk` CLI binary.
//!
//! Argument parsing, help output, completions, credential handling, and
//! one end-to-end run against a mock API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `backdesk` binary with env isolation.
///
/// Clears all `BACKDESK_*` env vars and points config lookups into `dir`
/// so tests never touch the user's real configuration or keyring.
fn backdesk_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("backdesk");
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("BACKDESK_CONFIG", dir.path().join("config.toml"))
        .env_remove("BACKDESK_PROFILE")
        .env_remove("BACKDESK_API_URL")
        .env_remove("BACKDESK_ADMIN_KEY")
        .env_remove("BACKDESK_CREDENTIALS_FILE")
        .env_remove("BACKDESK_OUTPUT")
        .env_remove("BACKDESK_INSECURE")
        .env_remove("BACKDESK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`backdesk_cmd`], with credentials kept in a file under `dir`.
fn backdesk_file_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = backdesk_cmd(dir);
    cmd.env("BACKDESK_CREDENTIALS_FILE", dir.path().join("credentials.toml"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_cmd(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    backdesk_cmd(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("users")
            .and(predicate::str::contains("orders"))
            .and(predicate::str::contains("services"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    backdesk_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("backdesk"));
}

#[test]
fn test_resource_help_lists_operations() {
    let dir = TempDir::new().unwrap();
    backdesk_cmd(&dir)
        .args(["users", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get-many"))
                .and(predicate::str::contains("refs"))
                .and(predicate::str::contains("update-many"))
                .and(predicate::str::contains("delete-many")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    backdesk_cmd(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let dir = TempDir::new().unwrap();
    backdesk_cmd(&dir)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_cmd(&dir).arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_cmd(&dir)
        .args(["--output", "xml", "users", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_update_requires_payload() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_cmd(&dir)
        .args(["orders", "update", "1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_list_without_login_exits_with_auth_code() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args(["users", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("login"));
}

#[test]
fn test_unknown_profile_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args(["--profile", "staging", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("staging"));
}

#[test]
fn test_invalid_api_url_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args(["--api-url", "not a url", "--admin-key", "k", "stats"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_delete_without_yes_in_non_tty() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args([
            "--api-url",
            "http://127.0.0.1:1",
            "--admin-key",
            "k",
            "orders",
            "delete",
            "7",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[test]
fn test_unreachable_api_exits_with_connection_code() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args(["--api-url", "http://127.0.0.1:1", "--admin-key", "k", "stats"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

// ── Credentials ─────────────────────────────────────────────────────

#[test]
fn test_login_status_logout_round_trip() {
    let dir = TempDir::new().unwrap();

    backdesk_file_cmd(&dir)
        .args(["login", "--key", "secret-admin-key"])
        .assert()
        .success();

    let stored = std::fs::read_to_string(dir.path().join("credentials.toml")).unwrap();
    assert!(stored.contains("x-admin-key"));
    assert!(stored.contains("secret-admin-key"));

    backdesk_file_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin key:    stored"));

    backdesk_file_cmd(&dir).arg("logout").assert().success();

    let output = backdesk_file_cmd(&dir).arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Admin key:    not stored"));
}

#[test]
fn test_login_rejects_empty_key() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args(["login", "--key", "   "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("credentials.toml").exists());
}

#[test]
fn test_service_key_login_does_not_authenticate_admin() {
    let dir = TempDir::new().unwrap();
    backdesk_file_cmd(&dir)
        .args(["login", "--scope", "service", "--key", "svc"])
        .assert()
        .success();

    let output = backdesk_file_cmd(&dir)
        .args(["-o", "json", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains(r#""service_key": true"#), "{text}");
    assert!(text.contains(r#""admin_key": false"#), "{text}");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_and_show() {
    let dir = TempDir::new().unwrap();
    backdesk_cmd(&dir)
        .args(["config", "set", "api_url", "https://api.example.com"])
        .assert()
        .success();

    backdesk_cmd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("https://api.example.com")),
        );
}

#[test]
fn test_config_set_unknown_key() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_cmd(&dir)
        .args(["config", "set", "password", "hunter2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("password"));
}

#[test]
fn test_config_use_unknown_profile() {
    let dir = TempDir::new().unwrap();
    let output = backdesk_cmd(&dir)
        .args(["config", "use", "prod"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("prod"));
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_users_list_against_mock_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(query_param("skip", "10"))
        .and(query_param("limit", "10"))
        .and(header("X-Admin-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                { "id": 11, "phone_number": "+10000000011" },
                { "id": 12, "phone_number": "+10000000012" }
            ],
            "total": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = backdesk_file_cmd(&dir)
        .args([
            "--api-url",
            &server.uri(),
            "--admin-key",
            "test-key",
            "-o",
            "json-compact",
            "users",
            "list",
            "--page",
            "2",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["id"], 11);
    assert_eq!(body[1]["phone_number"], "+10000000012");

    // --admin-key is never persisted.
    assert!(!dir.path().join("credentials.toml").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_table_uses_status_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/orders"))
        .and(query_param("status_filter", "in_progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [{ "id": 3, "user_id": 1, "status": "in_progress", "total_amount": 150 }],
            "total": 1
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    backdesk_file_cmd(&dir)
        .args([
            "--api-url",
            &server.uri(),
            "--admin-key",
            "k",
            "orders",
            "list",
            "--filter",
            "status=in_progress",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("In Progress"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid key" })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    backdesk_file_cmd(&dir)
        .args(["login", "--key", "stale"])
        .assert()
        .success();

    let output = backdesk_file_cmd(&dir)
        .args(["--api-url", &server.uri(), "stats"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));

    let stored = std::fs::read_to_string(dir.path().join("credentials.toml")).unwrap();
    assert!(!stored.contains("stale"));
}
