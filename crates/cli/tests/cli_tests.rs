use std::sync::atomic::{AtomicU32, Ordering};

use assert_cmd::Command;
use predicates::prelude::*;

static STORE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A fresh, never-reused `STORE_PATH` per test so a run that reaches
/// `Store::open` doesn't race other tests or leave files behind in the repo.
fn unique_store_path() -> std::path::PathBuf {
    let n = STORE_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("topicforge-cli-test-{}-{n}.db", std::process::id()))
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("topicforge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Durable work-queue and worker pool"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("topicforge").unwrap();
    cmd.arg("serve").arg("--help").assert().success();
}

#[test]
fn test_serve_exits_2_without_llm_api_keys() {
    let mut cmd = Command::cargo_bin("topicforge").unwrap();
    cmd.env_remove("LLM_API_KEYS")
        .env("STORE_PATH", unique_store_path())
        .assert()
        .code(2);
}

#[test]
fn test_serve_exits_1_without_llm_base_url() {
    let mut cmd = Command::cargo_bin("topicforge").unwrap();
    cmd.env("LLM_API_KEYS", "test-key")
        .env_remove("LLM_BASE_URL")
        .env("STORE_PATH", unique_store_path())
        .assert()
        .code(1);
}
