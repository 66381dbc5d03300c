//! CLI end-to-end tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn oregex() -> Command {
    Command::new(assert_cmd::cargo_bin!("oregex"))
}

#[test]
fn test_help() {
    oregex().arg("--help").assert().success();
}

#[test]
fn test_version() {
    oregex()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("oregex"));
}

#[test]
fn test_simple_match() {
    oregex()
        .args(["match", r"\d+", "hello 123 world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": true"))
        .stdout(predicate::str::contains("\"text\": \"123\""))
        .stdout(predicate::str::contains("\"encoding\": \"UTF8\""));
}

#[test]
fn test_no_match() {
    oregex()
        .args(["match", r"\d+", "hello world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": false"));
}

#[test]
fn test_match_window_keeps_lookbehind_context() {
    oregex()
        .args(["match", "(?<=2)1", "11221122", "--begin", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"engine\": \"fancy-regex\""))
        .stdout(predicate::str::contains("\"start\": 4"));
}

#[test]
fn test_match_window_out_of_bounds() {
    oregex()
        .args(["match", "a", "abc", "--end", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"code\":\"SEARCH_ERROR\""));
}

#[test]
fn test_capture_groups() {
    oregex()
        .args(["match", r"(\d{3})-(?<line>\d{4})", "123-4567"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"group\": 1"))
        .stdout(predicate::str::contains("\"name\": \"line\""));
}

#[test]
fn test_ignorecase_option() {
    oregex()
        .args(["match", "-o", "i", "HELLO", "say hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": true"))
        .stdout(predicate::str::contains("\"IGNORECASE\""));
}

#[test]
fn test_config_json() {
    oregex()
        .args(["match", "--config", r#"{"options": 1}"#, "HELLO", "say hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": true"))
        .stdout(predicate::str::contains("\"encoding\": \"ASCII\""));
}

#[test]
fn test_sub_first_only() {
    oregex()
        .args(["sub", r"\d+", "N", "a1b2c3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"aNb2c3\""))
        .stdout(predicate::str::contains("\"replacements_made\": 1"));
}

#[test]
fn test_gsub_with_groups() {
    oregex()
        .args(["gsub", r"(\d+)", r"<\1>", "a1b22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"a<1>b<22>\""))
        .stdout(predicate::str::contains("\"replacements_made\": 2"));
}

#[test]
fn test_gsub_named_group() {
    oregex()
        .args(["gsub", "(?<w>o+)", r"[\k<w>]", "foo boo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"f[oo] b[oo]\""));
}

#[test]
fn test_gsub_empty_pattern() {
    oregex()
        .args(["gsub", "", "-", "ab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"-a-b-\""))
        .stdout(predicate::str::contains("\"replacements_made\": 3"));
}

#[test]
fn test_scan() {
    oregex()
        .args(["scan", r"\w+", "a bb ccc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"match_count\": 3"))
        .stdout(predicate::str::contains("\"text\": \"ccc\""));
}

#[test]
fn test_scan_stdin() {
    oregex()
        .args(["scan", r"\d"])
        .write_stdin("x1y2")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"match_count\": 2"));
}

#[test]
fn test_scan_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("subject.txt");
    fs::write(&file_path, "one two three").unwrap();

    oregex()
        .args(["scan", r"t\w+", "--file", file_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"match_count\": 2"));
}

#[test]
fn test_text_format() {
    oregex()
        .args(["scan", r"\d+", "a1b22", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Match 2: \"22\" [3..5]"))
        .stdout(predicate::str::contains("2 matches found"));
}

#[test]
fn test_compile_error() {
    oregex()
        .args(["match", "(abc", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\":true"))
        .stderr(predicate::str::contains("\"code\":\"COMPILE_ERROR\""));
}

#[test]
fn test_unknown_encoding() {
    oregex()
        .args(["match", "--encoding", "klingon", "a", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("klingon"));
}

#[test]
fn test_unsupported_syntax() {
    oregex()
        .args(["match", "--syntax", "grep", "a", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("COMPILE_ERROR"));
}

#[test]
fn test_escape() {
    oregex()
        .args(["escape", "a.b*c", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"a\.b\*c"));
}

#[test]
fn test_inspect() {
    oregex()
        .args(["inspect", "-o", "ix", "a b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"display\": \"(?ix-m:a b)\""))
        .stdout(predicate::str::contains("\"inspect\": \"/a b/ix\""));
}

#[test]
fn test_apply_basic() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("test.txt");
    fs::write(&file_path, "hello world\nfoo bar\n").unwrap();

    oregex()
        .args([
            "apply",
            r"\bworld\b",
            "earth",
            "--file",
            file_path.to_str().unwrap(),
            "--no-backup",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"applied\": true"))
        .stdout(predicate::str::contains("\"replacements_made\": 1"));

    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "hello earth\nfoo bar\n");
    assert!(!dir.path().join("test.txt.bak").exists());
}

#[test]
fn test_apply_creates_backup() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("test.txt");
    fs::write(&file_path, "a a a\n").unwrap();

    oregex()
        .args([
            "apply",
            "a",
            "b",
            "--file",
            file_path.to_str().unwrap(),
            "--first",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"backup_path\""));

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "b a a\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("test.txt.bak")).unwrap(),
        "a a a\n"
    );
}

#[test]
fn test_apply_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("test.txt");
    fs::write(&file_path, "hello world\n").unwrap();

    oregex()
        .args([
            "apply",
            "world",
            "earth",
            "--file",
            file_path.to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"applied\": false"))
        .stdout(predicate::str::contains("\"replacements_made\": 1"));

    // File should NOT be modified
    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "hello world\n");
}

#[test]
fn test_apply_missing_file() {
    oregex()
        .args(["apply", "a", "b", "--file", "/nonexistent/oregex.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"code\":\"IO_ERROR\""));
}
