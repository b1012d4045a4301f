//! CLI Integration Tests
//!
//! These tests run the `idolstage` binary end-to-end against temporary
//! script, layout and config files.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

fn cli_cmd() -> Command {
    Command::cargo_bin("idolstage").expect("Failed to find idolstage binary")
}

/// Write `contents` to `name` inside `dir` and return the path
fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

fn run_json(script: &str, extra: &[&str]) -> serde_json::Value {
    let dir = TempDir::new().unwrap();
    let script = write_file(&dir, "script.json", script);

    let output = cli_cmd()
        .arg("run")
        .arg("--script")
        .arg(&script)
        .args(["--year", "2026", "--json"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "run failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("run --json prints JSON")
}

// ============================================================================
// Layout and Config Commands
// ============================================================================

#[test]
fn test_layout_prints_promo_page() {
    cli_cmd()
        .arg("layout")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""kind": "gallery""#))
        .stdout(predicate::str::contains(r##""href": "#members""##));
}

#[test]
fn test_config_prints_defaults() {
    cli_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""default_filter": "live""#))
        .stdout(predicate::str::contains(r#""transition_ms": 300"#));
}

// ============================================================================
// Inspect Command
// ============================================================================

#[test]
fn test_inspect_shows_mounted_tree() {
    cli_cmd()
        .args(["inspect", "--year", "2030"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nav#navbar"))
        .stdout(predicate::str::contains("div.loader"))
        .stdout(predicate::str::contains("2030"));
}

#[test]
fn test_inspect_custom_layout() {
    let dir = TempDir::new().unwrap();
    let layout = write_file(
        &dir,
        "layout.json",
        r#"{"sections": [{"id": "news", "kind": "text", "body": "Tour announced"}]}"#,
    );

    cli_cmd()
        .arg("inspect")
        .arg("--layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("section#news.fade-section"))
        .stdout(predicate::str::contains("nav#navbar").not());
}

#[test]
fn test_inspect_rejects_invalid_layout() {
    let dir = TempDir::new().unwrap();
    let layout = write_file(&dir, "layout.json", r#"{"viewport_width": -1}"#);

    cli_cmd()
        .arg("inspect")
        .arg("--layout")
        .arg(&layout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid layout"));
}

// ============================================================================
// Run Command
// ============================================================================

#[test]
fn test_run_scroll_sequence() {
    let out = run_json(
        r#"[
            {"step": "scroll", "offset": 0},
            {"step": "scroll", "offset": 60},
            {"step": "scroll", "offset": 200}
        ]"#,
        &[],
    );

    assert_eq!(out["report"]["navbar"]["scrolled"], true);
    assert_eq!(out["report"]["navbar"]["hidden_by_direction"], true);
    assert_eq!(out["steps"][2]["outcome"]["handled"], 1);
}

#[test]
fn test_run_lightbox_cycle_releases_lock() {
    let out = run_json(
        r#"[
            {"step": "click", "selector": ".gallery-item", "index": 1},
            {"step": "wait", "ms": 10},
            {"step": "key", "key": "Escape"},
            {"step": "wait", "ms": 300}
        ]"#,
        &[],
    );

    assert_eq!(out["steps"][1]["at_ms"], 10);
    assert_eq!(out["report"]["lightbox"], "closed");
    assert_eq!(out["report"]["scroll_locked"], false);
    assert_eq!(out["report"]["now_ms"], 310);
}

#[test]
fn test_run_anchor_click_prevents_default() {
    let out = run_json(
        r##"[
            {"step": "click", "selector": ".menu-toggle"},
            {"step": "click", "selector": "a[href=\"#shows\"]"}
        ]"##,
        &[],
    );

    assert_eq!(out["steps"][1]["outcome"]["prevent_default"], true);
    assert_eq!(out["report"]["menu_open"], false);
}

#[test]
fn test_run_settle_removes_loader() {
    let out = run_json(r#"[{"step": "load"}]"#, &["--settle"]);
    assert_eq!(out["report"]["loader_attached"], false);
    assert_eq!(out["report"]["pending_timers"], 0);
}

#[test]
fn test_run_text_report() {
    let dir = TempDir::new().unwrap();
    let script = write_file(
        &dir,
        "script.json",
        r#"[{"step": "click", "selector": ".donate-btn"}]"#,
    );

    cli_cmd()
        .arg("run")
        .arg("--script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("click .donate-btn[0] -> 1 handler(s)"))
        .stdout(predicate::str::contains("Modal: open"))
        .stdout(predicate::str::contains("Scroll lock: locked"));
}

#[test]
fn test_run_custom_config() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config.json", r#"{"default_filter": "backstage"}"#);
    let script = write_file(&dir, "script.json", "[]");

    cli_cmd()
        .arg("run")
        .arg("--script")
        .arg(&script)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Filter: backstage (1 visible)"));
}

#[test]
fn test_run_missing_element_fails() {
    let dir = TempDir::new().unwrap();
    let script = write_file(
        &dir,
        "script.json",
        r#"[{"step": "click", "selector": ".poster-item", "index": 9}]"#,
    );

    cli_cmd()
        .arg("run")
        .arg("--script")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step 1"));
}

#[test]
fn test_run_missing_script_fails() {
    cli_cmd()
        .args(["run", "--script", "/nonexistent/steps.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script"));
}
