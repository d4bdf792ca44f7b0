use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const FIBONACCI: &str = include_str!("../../tinyc/tests/programs/fibonacci.c");

fn source_file(source: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".c").tempfile().expect("create temp file");
    file.write_all(source.as_bytes()).expect("write temp file");
    file
}

fn tinyc() -> Command {
    Command::cargo_bin("tinyc").expect("binary builds")
}

#[test]
fn run_defaults_to_start() {
    let file = source_file(FIBONACCI);
    tinyc().arg("run").arg(file.path()).assert().success().stdout("1\n");
}

#[test]
fn run_a_specific_function_with_arguments() {
    let file = source_file(FIBONACCI);
    tinyc()
        .args(["run", "-f", "fibb", "-a", "10"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("55\n");
}

#[test]
fn run_rejects_unknown_functions() {
    let file = source_file(FIBONACCI);
    tinyc()
        .args(["run", "-f", "missing"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown function"));
}

#[test]
fn traps_exit_nonzero() {
    let file = source_file("int start() { return 1 / 0; }");
    tinyc()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("integer divide by zero"));
}

#[test]
fn parse_errors_are_reported() {
    let file = source_file("int start( { return 0; }");
    tinyc().arg("run").arg(file.path()).assert().failure().stderr(predicate::str::contains("expected"));
}

#[test]
fn build_prints_assembly_to_stdout() {
    let file = source_file(FIBONACCI);
    tinyc()
        .arg("build")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".global start").and(predicate::str::contains("call fibb")));
}

#[test]
fn build_writes_an_archive_that_runs() {
    let file = source_file(FIBONACCI);
    let out = tempfile::Builder::new().suffix(".tac").tempfile().expect("create temp file");

    tinyc().args(["build", "--emit", "tac", "-o"]).arg(out.path()).arg(file.path()).assert().success();
    tinyc().args(["run", "-f", "fibb_iter", "-a", "9"]).arg(out.path()).assert().success().stdout("34\n");
}

#[test]
fn emit_tac_requires_an_output_path() {
    let file = source_file(FIBONACCI);
    tinyc()
        .args(["build", "--emit", "tac"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires an output file"));
}
