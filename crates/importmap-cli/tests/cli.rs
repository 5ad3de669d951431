//! Integration tests for the importmap binary
//!
//! Only offline commands are exercised here; registry-backed commands are
//! covered by the library tests.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MAP: &str = r#"{
    "imports": {
        "react": "https://esm.sh/react@18.2.0",
        "app/": "/src/"
    },
    "scopes": {
        "/legacy/": {"react": "https://esm.sh/react@16.14.0"},
        "/app/": {"react": "https://esm.sh/react@18.2.0"}
    }
}"#;

fn run(args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_importmap");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run importmap binary")
}

fn write_map(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_resolve_top_level() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", MAP);

    let output = run(&["resolve", "react", "--map", &map, "--from", "/main.js"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "https://esm.sh/react@18.2.0");
}

#[test]
fn test_resolve_scoped() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", MAP);

    let output = run(&["resolve", "react", "--map", &map, "--from", "/legacy/old.js"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "https://esm.sh/react@16.14.0");
}

#[test]
fn test_resolve_prefix() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", MAP);

    let output = run(&["resolve", "app/util/math.js", "--map", &map]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "/src/util/math.js");
}

#[test]
fn test_resolve_unmapped_exits_with_two() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", MAP);

    let output = run(&["resolve", "left-pad", "--map", &map]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output).trim(), "left-pad");
}

#[test]
fn test_resolve_from_html() {
    let dir = TempDir::new().unwrap();
    let html = format!(
        "<html><head><script type=\"importmap\">{}</script></head></html>",
        MAP
    );
    let map = write_map(&dir, "index.html", &html);

    let output = run(&[
        "resolve",
        "react",
        "--map",
        &map,
        "--base",
        "https://example.com/",
        "--from",
        "https://example.com/main.js",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "https://esm.sh/react@18.2.0");
}

#[test]
fn test_check_html_without_import_map_warns() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "index.html", "<html><body></body></html>");

    let output = run(&["check", &map]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no import map script"));
    assert!(stdout(&output).contains("0 imports"));
}

#[test]
fn test_tidy_keeps_written_key_order() {
    let dir = TempDir::new().unwrap();
    let map = write_map(
        &dir,
        "importmap.json",
        r#"{"imports": {"zeta": "/z.js", "alpha": "/a.js"}, "scopes": {"/app/": {"alpha": "/a.js"}}}"#,
    );

    assert!(run(&["tidy", "--map", &map]).status.success());

    let rewritten = fs::read_to_string(&map).unwrap();
    let zeta = rewritten.find("\"zeta\"").unwrap();
    let alpha = rewritten.find("\"alpha\"").unwrap();
    assert!(zeta < alpha);
    assert!(!rewritten.contains("/app/"));
}

#[test]
fn test_resolve_missing_map_file() {
    let output = run(&["resolve", "react", "--map", "/nonexistent/importmap.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[test]
fn test_check_reports_dropped_entries() {
    let dir = TempDir::new().unwrap();
    let map = write_map(
        &dir,
        "importmap.json",
        r#"{"imports": {"ok": "/ok.js", "bad": ""}, "scopes": {"/x/": 3}}"#,
    );

    let output = run(&["check", &map]);
    let out = stdout(&output);
    assert!(output.status.success());
    assert!(out.contains(r#"imports["bad"]"#));
    assert!(out.contains(r#"scopes["/x/"]"#));
    assert!(out.contains("2 dropped"));
}

#[test]
fn test_check_strict_fails_on_invalid_entries() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", r#"{"imports": {"bad": 1}}"#);

    let output = run(&["check", "--strict", &map]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid entries"));

    let clean = write_map(&dir, "clean.json", MAP);
    assert!(run(&["check", "--strict", &clean]).status.success());
}

#[test]
fn test_check_malformed_json() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", "{ \"imports\": ");

    let output = run(&["check", &map]);
    assert!(!output.status.success());
}

#[test]
fn test_tidy_rewrites_map() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "importmap.json", MAP);

    let output = run(&["tidy", "--map", &map]);
    assert!(output.status.success());

    let rewritten: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
    assert!(rewritten["scopes"].get("/app/").is_none());
    assert_eq!(
        rewritten["scopes"]["/legacy/"]["react"],
        "https://esm.sh/react@16.14.0"
    );
    assert_eq!(rewritten["imports"]["app/"], "/src/");

    let again = run(&["tidy", "--map", &map]);
    assert!(stdout(&again).contains("already tidy"));
}

#[test]
fn test_editing_html_is_rejected() {
    let dir = TempDir::new().unwrap();
    let map = write_map(&dir, "index.html", "<html></html>");

    let output = run(&["tidy", "--map", &map]);
    assert!(!output.status.success());
    assert!(Path::new(&map).exists());
    assert_eq!(fs::read_to_string(&map).unwrap(), "<html></html>");
}
