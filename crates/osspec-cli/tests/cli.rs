//! CLI contract tests: exit codes and output layout.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture_repo() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata/repo")
}

fn copy_tree(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn osspec() -> Command {
    Command::cargo_bin("osspec").expect("osspec binary")
}

#[test]
fn validate_succeeds_on_example_repo() {
    osspec()
        .arg("validate")
        .arg("--repo")
        .arg(fixture_repo())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn validate_fails_with_aggregated_violations() {
    let tmp = tempdir().unwrap();
    copy_tree(&fixture_repo(), tmp.path());
    fs::write(
        tmp.path().join("specs/rulesets/broken.json"),
        r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "broken.v1",
    "name": "Broken",
    "scope": { "kind": "global", "connector_kind": "okta" },
    "rules": [
      {
        "key": "R1",
        "title": "R1",
        "severity": "low",
        "monitoring": { "status": "automated" },
        "required_data": []
      }
    ]
  }
}"#,
    )
    .unwrap();

    osspec()
        .arg("validate")
        .arg("--repo")
        .arg(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("validation failed:"))
        .stderr(predicate::str::contains("forbids scope.connector_kind"))
        .stderr(predicate::str::contains("requires rule.check"));
}

#[test]
fn validate_fails_on_missing_repo_inputs() {
    let tmp = tempdir().unwrap();
    osspec()
        .arg("validate")
        .arg("--repo")
        .arg(tmp.path())
        .assert()
        .code(1);
}

#[test]
fn unknown_subcommand_exits_two() {
    osspec()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn build_writes_dist_layout() {
    let tmp = tempdir().unwrap();
    copy_tree(&fixture_repo(), tmp.path());

    osspec()
        .arg("build")
        .arg("--repo")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("built"));

    for rel in [
        "dist/descriptor.v1.json",
        "dist/index/artifacts.json",
        "dist/index/requirements.json",
        "dist/index/dictionary.compiled.json",
        "dist/compiled/rulesets/example.count.v1.json",
        "dist/compiled/datasets/okta_log-streams.v1.json",
    ] {
        let path = tmp.path().join(rel);
        assert!(path.is_file(), "missing {rel}");
        let bytes = fs::read(path).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'), "{rel} must end with newline");
    }
}

#[test]
fn build_honors_out_dir() {
    let tmp = tempdir().unwrap();
    copy_tree(&fixture_repo(), tmp.path());

    osspec()
        .arg("build")
        .arg("--repo")
        .arg(tmp.path())
        .arg("--out")
        .arg("release")
        .assert()
        .success();

    assert!(tmp.path().join("release/descriptor.v1.json").is_file());
    assert!(!tmp.path().join("dist").exists());
}
