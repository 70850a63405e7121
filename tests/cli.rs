//! CLI smoke tests for the `cfgdb` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create tree");
    fs::write(path, content).expect("write definition file");
}

fn sample_tree() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    write_file(
        tmp.path(),
        "radioss2023/MAT/mat42.cfg",
        r#"
ATTRIBUTES(COMMON) {
    RHO = VALUE(FLOAT, "Initial density");
}
GUI(COMMON) {
    ASSIGN(KEYWORD_STR, "/MAT/LAW42");
    mandatory:
    SCALAR(RHO) { DIMENSION = "density"; }
}
"#,
    );
    tmp
}

fn cfgdb() -> Command {
    Command::cargo_bin("cfgdb").expect("binary under test")
}

#[test]
fn build_emits_json_on_stdout() {
    let tmp = sample_tree();
    cfgdb()
        .args(["build", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("MAT_LAW42"))
        .stdout(predicate::str::contains("\"keywords\""));
}

#[test]
fn build_writes_yaml_to_a_file() {
    let tmp = sample_tree();
    let out = tmp.path().join("db.yaml");
    cfgdb()
        .args([
            "build",
            tmp.path().to_str().unwrap(),
            "--format",
            "yaml",
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let written = fs::read_to_string(&out).expect("output file");
    assert!(written.contains("MAT_LAW42"));
}

#[test]
fn lookup_prints_the_keyword() {
    let tmp = sample_tree();
    cfgdb()
        .args(["lookup", tmp.path().to_str().unwrap(), "RADIOSS", "MAT_LAW42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"MAT_LAW42\""));
}

#[test]
fn lookup_of_unknown_keyword_fails_loudly() {
    let tmp = sample_tree();
    cfgdb()
        .args(["lookup", tmp.path().to_str().unwrap(), "RADIOSS", "MAT_LAW999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn missing_root_is_a_hard_failure() {
    cfgdb()
        .args(["build", "/definitely/not/a/root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root directory not found"));
}

#[test]
fn defects_subcommand_summarizes() {
    let tmp = sample_tree();
    write_file(tmp.path(), "radioss2023/MAT/odd.cfg", "ATTRIBUTES(COMMON) {\n  broken line\n}\n");
    cfgdb()
        .args(["defects", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("declaration skip"))
        .stdout(predicate::str::contains("keywords, "));
}