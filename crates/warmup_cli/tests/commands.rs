use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use warmup_scan::encode_package;

fn warmup(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_warmup"))
        .args(args)
        .arg("--color")
        .arg("never")
        .output()
        .unwrap()
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("Content");
    fs::create_dir_all(&content).unwrap();
    fs::write(content.join("A.uasset"), encode_package("/Game/A", &[], &[1; 64])).unwrap();
    fs::write(
        content.join("B.uasset"),
        encode_package("/Game/B", &["/Game/A"], &[2; 64]),
    )
    .unwrap();
    dir
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn analyze_prints_json_report() {
    let dir = project();
    let out = warmup(&["analyze", s(dir.path())]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["total_assets"], 2);
    assert_eq!(report["edge_count"], 1);
}

#[test]
fn cache_then_check_and_verify() {
    let dir = project();
    let cache = dir.path().join("Saved/warmup/startup.uefast");

    assert!(warmup(&["cache", s(dir.path())]).status.success());
    assert!(cache.exists());

    let check = warmup(&["check", s(&cache)]);
    assert!(check.status.success());
    assert_eq!(String::from_utf8_lossy(&check.stdout).trim(), "usable");

    let verify = warmup(&["verify", s(dir.path()), "--strict"]);
    assert!(verify.status.success());

    fs::write(dir.path().join("Content/C.uasset"), encode_package("/Game/C", &[], &[])).unwrap();
    let drift = warmup(&["quick-verify", s(dir.path()), "--strict", "--format", "json"]);
    assert_eq!(drift.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&drift.stdout).unwrap();
    assert_eq!(report["added"][0], "Content/C.uasset");
}

#[test]
fn check_rejects_foreign_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.bin");
    fs::write(&path, b"definitely not a cache").unwrap();
    let out = warmup(&["check", s(&path)]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "unusable");
}

#[test]
fn stats_on_bad_magic_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.uefast");
    fs::write(&path, b"definitely not a cache").unwrap();
    let out = warmup(&["stats", s(&path)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error:"));
    assert_eq!(fs::read(&path).unwrap(), b"definitely not a cache");
}

#[test]
fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nowhere");
    let out = warmup(&["cache", s(&root)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("project root not found"));
    assert!(!root.join("Saved").exists());
}

#[test]
fn graph_export_emits_dot() {
    let dir = project();
    let out = warmup(&["graph-export", s(dir.path())]);
    assert!(out.status.success());
    let dot = String::from_utf8_lossy(&out.stdout);
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("->"));
}

#[test]
fn cache_keeps_existing_file_unless_forced() {
    let dir = project();
    let cache = dir.path().join("Saved/warmup/startup.uefast");
    fs::create_dir_all(cache.parent().unwrap()).unwrap();
    fs::write(&cache, b"stale bytes").unwrap();

    assert!(warmup(&["cache", s(dir.path())]).status.success());
    assert_eq!(fs::read(&cache).unwrap(), b"stale bytes");

    assert!(warmup(&["cache", s(dir.path()), "--force"]).status.success());
    let check = warmup(&["check", s(&cache)]);
    assert!(check.status.success());
}

#[test]
fn scan_filter_lists_one_kind() {
    let dir = project();
    fs::write(dir.path().join("Content/icon.png"), b"\x89PNG\r\n\x1a\n....").unwrap();

    let out = warmup(&["scan", s(dir.path()), "--filter", "texture", "--format", "json"]);
    assert!(out.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["path"], "Content/icon.png");

    let all = warmup(&["scan", s(dir.path()), "--format", "json"]);
    let all: serde_json::Value = serde_json::from_slice(&all.stdout).unwrap();
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[test]
fn cache_report_carries_duplicates_and_recommendations() {
    let dir = project();
    let copy = fs::read(dir.path().join("Content/A.uasset")).unwrap();
    fs::write(dir.path().join("Content/A_copy.uasset"), copy).unwrap();
    let report_path = dir.path().join("report.json");

    let out = warmup(&["cache", s(dir.path()), "--report", s(&report_path)]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&fs::read(&report_path).unwrap()).unwrap();
    let groups = report["duplicates"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["paths"][0], "Content/A.uasset");
    assert_eq!(groups[0]["paths"][1], "Content/A_copy.uasset");
    assert!(report["estimated_savings_seconds"].as_f64().unwrap() > 0.0);
    assert!(report["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["category"] == "duplicates"));

    let analyze = warmup(&["analyze", s(dir.path())]);
    let analyzed: serde_json::Value = serde_json::from_slice(&analyze.stdout).unwrap();
    assert!(analyzed["duplicates"].is_null());
}

#[test]
fn verify_writes_result_to_output_file() {
    let dir = project();
    assert!(warmup(&["cache", s(dir.path())]).status.success());

    let result = dir.path().join("out/verify.json");
    let out = warmup(&["verify", s(dir.path()), "--format", "json", "-o", s(&result)]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    let report: serde_json::Value = serde_json::from_slice(&fs::read(&result).unwrap()).unwrap();
    assert_eq!(report["unchanged"], 2);
    assert_eq!(report["mode"], "full");
}
