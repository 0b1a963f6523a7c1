//! CLI tests for the `ga` binary
//!
//! Only paths that stop before any network call are exercised.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `ga` with an isolated data dir and a config pointing at unset key variables
fn ga(dir: &TempDir) -> Command {
    let config = dir.path().join("greenalt.yml");
    std::fs::write(
        &config,
        "llm:\n  api-key-env: GREENALT_CLI_TEST_LLM_KEY\nsearch:\n  api-key-env: GREENALT_CLI_TEST_SEARCH_KEY\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("ga").unwrap();
    cmd.env("XDG_DATA_HOME", dir.path())
        .env("HOME", dir.path())
        .env_remove("GREENALT_CLI_TEST_LLM_KEY")
        .env_remove("GREENALT_CLI_TEST_SEARCH_KEY")
        .arg("--config")
        .arg(&config);
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("ga")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("product"));
}

#[test]
fn test_find_without_api_key_fails_fast() {
    let dir = TempDir::new().unwrap();
    ga(&dir)
        .args(["find", "B0858J4BTK"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GREENALT_CLI_TEST_LLM_KEY"));
}

#[test]
fn test_search_without_api_key_fails_fast() {
    let dir = TempDir::new().unwrap();
    ga(&dir)
        .args(["search", "bamboo toothbrush", "--max-price", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GREENALT_CLI_TEST_SEARCH_KEY"));
}

#[test]
fn test_search_requires_max_price() {
    let dir = TempDir::new().unwrap();
    ga(&dir)
        .args(["search", "bamboo toothbrush"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-price"));
}

#[test]
fn test_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    ga(&dir)
        .args(["product", "B0858J4BTK", "--format", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}
