//! Integration tests for the `cvcue` CLI binary.
//!
//! Argument parsing, help output, completions, and the errors raised
//! before any request reaches CV-CUE.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `cvcue` binary with env isolation.
///
/// Clears the `CV_CUE_*` / `CVCUE_*` variables and points config and
/// cache directories at a nonexistent path.
fn cvcue_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cvcue");
    cmd.env("HOME", "/tmp/cvcue-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/cvcue-cli-test-nonexistent")
        .env("XDG_CACHE_HOME", "/tmp/cvcue-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("CV_CUE_BASE_URL")
        .env_remove("CV_CUE_KEY_ID")
        .env_remove("CV_CUE_KEY_VALUE")
        .env_remove("CV_CUE_CLIENT_ID")
        .env_remove("CVCUE_PROFILE")
        .env_remove("CVCUE_SESSION_FILE")
        .env_remove("CVCUE_TIMEOUT")
        .env_remove("CVCUE_INSECURE");
    cmd
}

/// `cvcue_cmd` with a full credential set pointing at a closed port.
fn cvcue_with_creds(session_file: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cvcue_cmd();
    cmd.args([
        "--base-url",
        "http://127.0.0.1:9/wifi/api",
        "--key-id",
        "kid",
        "--key-value",
        "kvalue",
        "--client-id",
        "cli-test",
        "--session-file",
    ])
    .arg(session_file);
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
    let output = cvcue_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    cvcue_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("CV-CUE")
            .and(predicate::str::contains("list-aps"))
            .and(predicate::str::contains("get-all-aps"))
            .and(predicate::str::contains("session")),
    );
}

#[test]
fn test_version_flag() {
    cvcue_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cvcue"));
}

#[test]
fn test_list_aps_help_lists_query_flags() {
    cvcue_cmd().args(["list-aps", "--help"]).assert().success().stdout(
        predicate::str::contains("--filter")
            .and(predicate::str::contains("--filter-operator"))
            .and(predicate::str::contains("--pagesize"))
            .and(predicate::str::contains("--total-count")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    cvcue_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    cvcue_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cvcue"));
}

// ── Query validation ────────────────────────────────────────────────

#[test]
fn test_unknown_filter_operator_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let output = cvcue_with_creds(&dir.path().join("session.json"))
        .args(["list-aps", "--filter", "name:badop:Arista"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("badop"), "Expected operator in error:\n{text}");
    assert!(
        !dir.path().join("session.json").exists(),
        "No login should have been attempted"
    );
}

#[test]
fn test_negative_pagesize_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    cvcue_with_creds(&dir.path().join("session.json"))
        .args(["get-all-aps", "--pagesize", "-5"])
        .assert()
        .code(2);
}

#[test]
fn test_pagesize_above_limit_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    cvcue_with_creds(&dir.path().join("session.json"))
        .args(["list-aps", "--pagesize", "5000"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_output_format_rejected_by_clap() {
    cvcue_cmd()
        .args(["list-aps", "--output", "count"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_credentials_is_usage_error() {
    let output = cvcue_cmd().args(["list-aps"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("CV_CUE_"), "Expected env var hint:\n{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let output = cvcue_cmd()
        .args(["--profile", "nope", "list-aps"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("nope"), "Expected profile name:\n{text}");
}

#[test]
fn test_unreachable_host_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    cvcue_with_creds(&dir.path().join("session.json"))
        .args(["--timeout", "5", "list-aps"])
        .assert()
        .code(7);
}

// ── Session commands ────────────────────────────────────────────────

#[test]
fn test_session_status_without_cache() {
    let dir = tempfile::tempdir().unwrap();
    cvcue_cmd()
        .arg("--session-file")
        .arg(dir.path().join("session.json"))
        .args(["session", "status"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Session is not active")
                .and(predicate::str::contains("cvcue session login")),
        );
}

#[test]
fn test_session_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    std::fs::write(&file, "{}").unwrap();

    for _ in 0..2 {
        cvcue_cmd()
            .arg("--session-file")
            .arg(&file)
            .args(["session", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Session cache cleared"));
    }
    assert!(!file.exists());
}

#[test]
fn test_quiet_suppresses_status_output() {
    let dir = tempfile::tempdir().unwrap();
    cvcue_cmd()
        .arg("--session-file")
        .arg(dir.path().join("session.json"))
        .args(["-q", "session", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
