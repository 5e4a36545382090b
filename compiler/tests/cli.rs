//! Behaviour of the `strata` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn strata() -> Command {
    Command::cargo_bin("strata").unwrap()
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn missing_file_argument_is_usage_error() {
    strata()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("a source file is required"));
}

#[test]
fn runs_program_and_writes_c_beside_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "hello.str",
        "import io from std::io\nlet x: int = 2 + 3 * 4\nio.print(x)\n",
    );

    strata()
        .arg(&source)
        .assert()
        .success()
        .stdout("14\n")
        .stderr(predicate::str::is_match(r"Executed in \d+\.\d{2}ms").unwrap());

    let c = fs::read_to_string(dir.path().join("hello.c")).unwrap();
    assert!(c.contains("int x = (2 + (3 * 4));"));
    assert!(c.contains("printf(\"%d\\n\", x);"));
}

#[test]
fn explicit_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "let a = 1\n");
    let out = dir.path().join("gen").join("out.c");

    strata()
        .arg(&source)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(out.is_file());
    assert!(!dir.path().join("p.c").exists());
}

#[test]
fn traversal_in_output_path_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "let a = 1\n");

    strata()
        .arg(&source)
        .arg("--output")
        .arg("../escape.c")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot contain '..'"));
}

#[test]
fn no_emit_skips_c_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "let a = 1\n");

    strata().arg(&source).arg("--no-emit").assert().success();
    assert!(!dir.path().join("p.c").exists());
}

#[test]
fn emit_only_does_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "import io from std::io\nio.print(\"ran\")\n");

    strata()
        .arg(&source)
        .arg("--emit-only")
        .assert()
        .success()
        .stdout("");
    assert!(dir.path().join("p.c").is_file());
}

#[test]
fn parse_error_shows_caret() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "bad.str", "let x = 1\nlet = 2\n");

    strata()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: Parse error at 2:5"))
        .stderr(predicate::str::contains("2 | let = 2\n  |     ^"));
}

#[test]
fn type_errors_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "types.str",
        "let a: string = 1\nlet b: bool = 2\n",
    );

    strata()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("type mismatch in declaration of 'a'"))
        .stderr(predicate::str::contains("type mismatch in declaration of 'b'"))
        .stderr(predicate::str::contains("2 type error(s)"));
    assert!(!dir.path().join("types.c").exists());
}

#[test]
fn no_check_lets_ill_typed_program_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        &dir,
        "p.str",
        "import io from std::io\nlet a: string = 1\nio.print(a)\n",
    );

    strata()
        .arg(&source)
        .arg("--no-check")
        .arg("--no-emit")
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn runtime_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "let x = 1\nx = 2\n");

    strata()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot reassign immutable variable 'x'"));
}

#[test]
fn verbose_progress() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "let a = 1\n");

    strata()
        .arg(&source)
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("Parsing"))
        .stderr(predicate::str::contains("Type checking..."))
        .stderr(predicate::str::contains("Wrote"));
}

#[test]
fn config_file_beside_source() {
    let dir = tempfile::tempdir().unwrap();
    write_source(&dir, "p.str", "let a = 1\n");
    fs::write(
        dir.path().join("strata.config.toml"),
        "[output]\nc_dir = \"build\"\n[diagnostics]\ntiming = false\n",
    )
    .unwrap();

    strata()
        .current_dir(dir.path())
        .arg("p.str")
        .assert()
        .success()
        .stderr(predicate::str::contains("Executed in").not());
    assert!(dir.path().join("build").join("p.c").is_file());
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, "p.str", "let a = 1\n");

    strata()
        .arg(&source)
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read config file"));
}

#[test]
fn unreadable_source_fails() {
    strata()
        .arg("does-not-exist.str")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read does-not-exist.str"));
}

#[test]
fn completions_subcommand() {
    strata()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("strata"));
}
