use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).expect("write fixture");
    path
}

fn javelin() -> Command {
    Command::cargo_bin("javelin").expect("binary builds")
}

#[test]
fn clean_file_exits_zero_with_empty_report() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_file(&dir, "A.java", "class A {\n\tvoid m() {\n\t}\n}\n");

    javelin()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn syntax_error_prints_the_report_and_fails() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_file(&dir, "A.java", "class A {\n\tvoid m() {\n\t\tint x = 1\n\t}\n}\n");

    javelin()
        .arg("check")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Syntax error, insert \";\" to complete LocalVariableDeclarationStatement",
        ))
        .stdout(predicate::str::contains("(at line 3)"));
}

#[test]
fn opt_in_checks_only_run_when_enabled() {
    let dir = TempDir::new().expect("tempdir");
    let source = "class A {\n\tvoid m() {\n\t\tString s = null;\n\t\ts.length();\n\t}\n}\n";
    let file = write_file(&dir, "A.java", source);

    javelin().arg("check").arg(&file).assert().success();

    javelin()
        .arg("check")
        .arg(&file)
        .arg("--enable")
        .arg("null-reference=error")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "The variable s can only be null at this location",
        ));
}

#[test]
fn warning_severity_does_not_fail_the_build() {
    let dir = TempDir::new().expect("tempdir");
    let source = "class A {\n\tString s = \"hello\";\n}\n";
    let file = write_file(&dir, "A.java", source);

    javelin()
        .arg("check")
        .arg(&file)
        .arg("--enable")
        .arg("non-externalized-string")
        .assert()
        .success()
        .stdout(predicate::str::contains("Non-externalized string literal"))
        .stdout(predicate::str::contains("1. WARNING in"));
}

#[test]
fn json_format_serializes_the_reports() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_file(&dir, "A.java", "class A {\n\tvoid m() {\n\t\tint x = y;\n\t}\n}\n");

    javelin()
        .arg("check")
        .arg(&file)
        .arg("--format")
        .arg("json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"y cannot be resolved\""))
        .stdout(predicate::str::contains("\"line_starts\""));
}

#[test]
fn multiple_files_report_in_path_order() {
    let dir = TempDir::new().expect("tempdir");
    let b = write_file(&dir, "B.java", "class B {\n\tvoid m() {\n\t\tint x = q;\n\t}\n}\n");
    let a = write_file(&dir, "A.java", "class A {\n\tvoid m() {\n\t\tint x = p;\n\t}\n}\n");

    let assert = javelin().arg("check").arg(&b).arg(&a).assert().code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8");
    let a_pos = stdout.find("A.java").expect("A entry");
    let b_pos = stdout.find("B.java").expect("B entry");
    assert!(a_pos < b_pos);
}

#[test]
fn missing_file_is_a_usage_error() {
    javelin()
        .arg("check")
        .arg("does-not-exist.java")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does-not-exist.java"));
}

#[test]
fn unknown_check_name_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_file(&dir, "A.java", "class A { }");

    javelin()
        .arg("check")
        .arg(&file)
        .arg("--enable")
        .arg("no-such-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown check"));
}
