//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated config directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_studyvssleep"))
        .env("STUDYVSSLEEP_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(config_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(config_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_difficulties_json() {
    let dir = tempfile::tempdir().unwrap();
    let rows = run_json(dir.path(), &["difficulties", "--json"]);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["level"], "easy");
    assert_eq!(rows[3]["decay_per_tick"], 0.6);
}

#[test]
fn test_simulate_easy_loses() {
    let dir = tempfile::tempdir().unwrap();
    let snap = run_json(dir.path(), &["simulate", "--difficulty", "easy", "--json"]);
    assert_eq!(snap["phase"], "lost");
    assert_eq!(snap["ticks"], 1000);
    assert_eq!(snap["progress"], 0.0);
}

#[test]
fn test_simulate_with_taps_wins() {
    let dir = tempfile::tempdir().unwrap();
    let snap = run_json(
        dir.path(),
        &["simulate", "-d", "Easy", "--tap-every", "60", "--json"],
    );
    assert_eq!(snap["phase"], "won");
    assert_eq!(snap["progress"], 100.0);
}

#[test]
fn test_simulate_rejects_unknown_difficulty() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["simulate", "--difficulty", "nightmare"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown difficulty"), "{stderr}");
}

#[test]
fn test_simulate_uses_configured_impulse() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "game.tap_impulse", "60"]);
    assert_eq!(code, 0);

    let snap = run_json(
        dir.path(),
        &["simulate", "-d", "hard", "--tap-every", "1", "--json"],
    );
    assert_eq!(snap["phase"], "won");
    assert_eq!(snap["taps"], 1);
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "game.tick_interval_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "16");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "game.default_difficulty", "hard"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "game.default_difficulty"]);
    assert_eq!(stdout.trim(), "hard");

    let snap = run_json(dir.path(), &["simulate", "--max-ticks", "1", "--json"]);
    assert_eq!(snap["difficulty"], "hard");

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "game.default_difficulty"]);
    assert_eq!(stdout.trim(), "medium");
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "game.tick_interval_ms", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("game.tick_interval_ms"), "{stderr}");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "game.unknown"]);
    assert_ne!(code, 0);
}

#[test]
fn test_play_quits_on_q() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_studyvssleep"))
        .env("STUDYVSSLEEP_CONFIG_DIR", dir.path())
        .args(["play", "--difficulty", "easy", "--no-ads"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child.stdin.take().unwrap().write_all(b"\n\nq\n").unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Study vs Sleep"), "{stdout}");
    assert!(stdout.contains("easy"), "{stdout}");
}
