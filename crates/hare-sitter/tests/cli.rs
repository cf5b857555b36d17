//! End-to-end tests of the `hare-sitter` binary.
#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn hare_sitter() -> Command {
    Command::cargo_bin("hare-sitter").unwrap()
}

fn source_file(source: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".ha").tempfile().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_file() {
    let file = source_file("def X: int = 1;\n");
    hare_sitter()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "(module (declarations (constant_declaration",
        ));
}

#[test]
fn test_parse_ctype_fixture() {
    hare_sitter()
        .arg("tests/fixtures/ctype.ha")
        .assert()
        .success()
        .stdout(predicate::str::contains("ERROR").not())
        .stdout(predicate::str::contains("MISSING").not());
}

#[test]
fn test_parse_stdin() {
    hare_sitter()
        .write_stdin("fn f() void;")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(function_declaration name: (identifier) returns: (builtin_type))",
        ));
}

#[test]
fn test_syntax_errors_exit_with_one() {
    hare_sitter()
        .write_stdin("def X: int = 1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#"(MISSING ";")"#));
}

#[test]
fn test_quiet_prints_nothing() {
    hare_sitter()
        .arg("--quiet")
        .write_stdin("def X: int = 1")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    hare_sitter()
        .arg(dir.path().join("absent.ha"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_max_depth() {
    let source = format!("def X: int = {}1{};", "(".repeat(32), ")".repeat(32));
    hare_sitter()
        .args(["--max-depth", "8"])
        .write_stdin(source)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nests deeper than 8 levels"));
}

#[test]
fn test_grammar_json() {
    hare_sitter()
        .arg("--grammar")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""hare""#))
        .stdout(predicate::str::contains("use_statement"))
        .stdout(predicate::str::contains(r#"{"type":"STRING","value":"use"}"#));
}

#[test]
fn test_validate() {
    hare_sitter()
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("unreachable: name_list"))
        .stdout(predicate::str::contains("left recursive: scoped_type_identifier"));
}
