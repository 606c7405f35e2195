//! Smoke tests for the pagewire CLI
//!
//! Every command except `check` runs offline, so these cover the binary end
//! to end.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the pagewire binary
fn pagewire() -> Command {
    let mut cmd = Command::cargo_bin("pagewire").expect("pagewire binary should exist");
    cmd.env_remove("PAGEWIRE_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    pagewire()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    pagewire()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lint"))
        .stdout(predicate::str::contains("decrypt"))
        .stdout(predicate::str::contains("data"));
}

#[test]
fn test_no_args_fails() {
    pagewire().assert().failure();
}

// ============================================================================
// parse / decrypt
// ============================================================================

#[test]
fn test_parse_locator() {
    pagewire()
        .args(["parse", "linktext == Forgot password?"])
        .assert()
        .success()
        .stdout("strategy: linkText\nvalue: Forgot password?\n");
}

#[test]
fn test_parse_invalid_locator() {
    pagewire()
        .args(["parse", "tag==div"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid locator syntax"));
}

#[test]
fn test_decrypt() {
    pagewire()
        .args(["decrypt", "506135357730726421"])
        .assert()
        .success()
        .stdout("Pa55w0rd!\n");
}

#[test]
fn test_decrypt_odd_length() {
    pagewire()
        .args(["decrypt", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decode failed"));
}

// ============================================================================
// lint
// ============================================================================

#[test]
fn test_lint_clean_page() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("login.yaml");
    fs::write(
        &page,
        concat!(
            "page: login\n",
            "locators:\n",
            "  username: id==username\n",
            "  submit: xpath==//button[@type='submit']\n",
        ),
    )
    .unwrap();

    pagewire()
        .arg("lint")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 locator(s) ok"));
}

#[test]
fn test_lint_bad_page_fails() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("broken.yaml");
    fs::write(&page, "page: broken\nlocators:\n  menu: klass==menu\n").unwrap();

    pagewire()
        .arg("lint")
        .arg(&page)
        .assert()
        .failure()
        .stdout(predicate::str::contains("menu"))
        .stderr(predicate::str::contains("1 invalid locator(s)"));
}

#[test]
fn test_lint_missing_file() {
    pagewire()
        .args(["lint", "does/not/exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

// ============================================================================
// data / config
// ============================================================================

#[test]
fn test_data_lists_properties() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("testData.properties");
    fs::write(&file, "username = alice\npassword=506135357730726421\n").unwrap();

    pagewire()
        .arg("data")
        .arg(&file)
        .assert()
        .success()
        .stdout("password=506135357730726421\nusername=alice\n");

    pagewire()
        .arg("data")
        .arg(&file)
        .args(["password", "--decrypt"])
        .assert()
        .success()
        .stdout("Pa55w0rd!\n");
}

#[test]
fn test_config_defaults() {
    pagewire()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_ms: 10000"))
        .stdout(predicate::str::contains("http://127.0.0.1:4723/wd/hub"));
}

#[test]
fn test_config_from_env() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("pagewire.yaml");
    fs::write(&file, "session:\n  platform: android\n").unwrap();

    pagewire()
        .env("PAGEWIRE_CONFIG", &file)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("platform: android"));
}
