//! End-to-end compile tests over real repo trees.

use std::fs;
use std::path::{Path, PathBuf};

use osspec_core::compiler::{build, compile, BuildOptions, CompileOptions};
use osspec_core::error::CompileError;
use osspec_core::loader::CancelToken;
use osspec_core::spec::CheckType;
use tempfile::{tempdir, TempDir};

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

/// A scratch repo seeded with the fixture's version, dictionary, and
/// metaschemas; tests add spec files on top.
fn scratch_repo() -> TempDir {
    let tmp = tempdir().unwrap();
    fs::copy(fixture_repo().join("version.json"), tmp.path().join("version.json")).unwrap();
    fs::copy(
        fixture_repo().join("dictionary.json"),
        tmp.path().join("dictionary.json"),
    )
    .unwrap();
    copy_tree(&fixture_repo().join("metaschema"), &tmp.path().join("metaschema"));
    fs::create_dir_all(tmp.path().join("specs")).unwrap();
    tmp
}

fn write_spec(repo: &Path, rel: &str, contents: &str) {
    let path = repo.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn compile_repo(repo: &Path) -> Result<osspec_core::compiler::CompileResult, CompileError> {
    compile(&CompileOptions::new(repo), &CancelToken::new())
}

#[test]
fn compiles_the_example_repo() {
    let result = compile_repo(&fixture_repo()).expect("compile example repo");
    let desc = &result.descriptor;

    assert_eq!(desc.schema_version, 1);
    assert_eq!(desc.kind, "opensspm.descriptor");
    assert_eq!(desc.version.project, "open-sspm");
    assert_eq!(desc.rulesets.len(), 3);
    assert_eq!(desc.dataset_contracts.len(), 3);
    assert_eq!(desc.connectors.len(), 1);
    assert_eq!(desc.profiles.len(), 1);

    // Loader order: alphabetical by rel path.
    let ruleset_paths: Vec<&str> = desc.rulesets.iter().map(|r| r.source_path.as_str()).collect();
    assert_eq!(
        ruleset_paths,
        vec![
            "specs/rulesets/example.count.json",
            "specs/rulesets/example.join.json",
            "specs/rulesets/example.manual.json",
        ]
    );

    // One artifact per document plus version and dictionary.
    assert_eq!(result.artifacts.artifacts.len(), 10);
    let sorted: Vec<(String, String)> = result
        .artifacts
        .artifacts
        .iter()
        .map(|a| (a.kind.clone(), a.key.clone()))
        .collect();
    let mut expected = sorted.clone();
    expected.sort();
    assert_eq!(sorted, expected, "artifacts must be sorted by (kind, key)");
    assert!(sorted.contains(&(
        "opensspm.dataset_contract".to_string(),
        "okta:log-streams@1".to_string()
    )));
    assert!(sorted.contains(&("opensspm.version".to_string(), "version".to_string())));

    for artifact in &result.artifacts.artifacts {
        assert_eq!(artifact.hash.len(), 64, "hash for {}", artifact.key);
    }
}

#[test]
fn manual_rule_requirements_roll_up_empty() {
    let result = compile_repo(&fixture_repo()).expect("compile example repo");
    let rulesets = &result.requirements.rulesets;

    // Emitted sorted by ruleset_key.
    let keys: Vec<&str> = rulesets.iter().map(|r| r.ruleset_key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["example.count.v1", "example.join.v1", "example.manual.v1"]
    );

    let manual = &rulesets[2];
    assert_eq!(manual.status, "active");
    assert_eq!(manual.scope.connector_kind.as_deref(), Some("okta"));
    let rule = &manual.rules[0];
    assert!(rule.is_manual);
    assert!(rule.datasets.is_empty());
    assert!(rule.value_params.is_empty());
    assert_eq!(rule.check_type, None);
}

#[test]
fn count_compare_requirements_capture_datasets_and_params() {
    let result = compile_repo(&fixture_repo()).expect("compile example repo");
    let count = &result.requirements.rulesets[0];
    assert_eq!(count.ruleset_key, "example.count.v1");

    let rule = &count.rules[0];
    assert!(!rule.is_manual);
    assert_eq!(rule.check_type, Some(CheckType::DatasetCountCompare));
    assert_eq!(rule.datasets.len(), 1);
    assert_eq!(rule.datasets[0].dataset, "okta:log-streams");
    assert_eq!(rule.datasets[0].version, 1);
    assert_eq!(rule.value_params, vec!["min_enabled".to_string()]);

    let join = &result.requirements.rulesets[1];
    assert_eq!(
        join.datasets
            .iter()
            .map(|d| d.dataset.as_str())
            .collect::<Vec<_>>(),
        vec!["core:entitlement_assignments", "core:identities"]
    );
}

#[test]
fn schema_validation_precedes_semantic_validation() {
    let tmp = scratch_repo();
    // Fails the schema (rules must be non-empty) and would also fail
    // semantically (global scope with connector_kind); only the schema error
    // may surface.
    write_spec(
        tmp.path(),
        "specs/rulesets/bad.json",
        r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "bad.v1",
    "name": "Bad",
    "scope": { "kind": "global", "connector_kind": "okta" },
    "rules": []
  }
}"#,
    );

    let err = compile_repo(tmp.path()).unwrap_err();
    match &err {
        CompileError::Schema { path, .. } => {
            assert_eq!(path, "specs/rulesets/bad.json");
            assert!(err.to_string().contains("/ruleset/rules"), "{err}");
        }
        other => panic!("expected schema error, got: {other}"),
    }
}

#[test]
fn semantic_violations_surface_together() {
    let tmp = scratch_repo();
    write_spec(
        tmp.path(),
        "specs/rulesets/a.json",
        r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "dup.v1",
    "name": "A",
    "scope": { "kind": "global" },
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
    );
    write_spec(
        tmp.path(),
        "specs/rulesets/b.json",
        r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "dup.v1",
    "name": "B",
    "scope": { "kind": "connector_instance" },
    "rules": [
      {
        "key": "R1",
        "title": "R1",
        "severity": "low",
        "monitoring": { "status": "manual" },
        "required_data": []
      }
    ]
  }
}"#,
    );

    let err = compile_repo(tmp.path()).unwrap_err();
    let text = err.to_string();
    assert!(matches!(err, CompileError::Validation(_)), "{text}");
    assert!(text.contains("validation failed:"), "{text}");
    assert!(text.contains("duplicate ruleset.key"), "{text}");
    assert!(text.contains("requires rule.check"), "{text}");
    assert!(text.contains("requires scope.connector_kind"), "{text}");
}

#[test]
fn ambiguous_dataset_version_fails_compile() {
    let tmp = scratch_repo();
    write_spec(
        tmp.path(),
        "specs/rulesets/ambiguous.json",
        r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "ambiguous.v1",
    "name": "Ambiguous",
    "scope": { "kind": "global" },
    "data_contracts": [
      { "dataset": "okta:log-streams", "version": 1 },
      { "dataset": "okta:log-streams", "version": 2 }
    ],
    "rules": [
      {
        "key": "R1",
        "title": "R1",
        "severity": "low",
        "monitoring": { "status": "automated" },
        "required_data": ["okta:log-streams"],
        "parameters": { "defaults": { "min_enabled": 1 } },
        "check": {
          "type": "dataset.count_compare",
          "dataset": "okta:log-streams",
          "compare": { "op": "gte", "value_param": "min_enabled" }
        }
      }
    ]
  }
}"#,
    );

    let err = compile_repo(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("dataset_version is required"), "{err}");
}

#[test]
fn unsupported_schema_version_is_a_header_error() {
    let tmp = scratch_repo();
    write_spec(
        tmp.path(),
        "specs/rulesets/future.json",
        r#"{"schema_version": 2, "kind": "opensspm.ruleset", "ruleset": {}}"#,
    );

    let err = compile_repo(tmp.path()).unwrap_err();
    assert!(matches!(err, CompileError::Header { .. }), "{err}");
    assert!(err.to_string().contains("unsupported schema_version 2"), "{err}");
}

#[test]
fn unknown_kind_is_rejected() {
    let tmp = scratch_repo();
    write_spec(
        tmp.path(),
        "specs/bogus.json",
        r#"{"schema_version": 1, "kind": "opensspm.bogus"}"#,
    );

    let err = compile_repo(tmp.path()).unwrap_err();
    assert!(
        err.to_string().contains("no schema registered for kind \"opensspm.bogus\""),
        "{err}"
    );
}

#[test]
fn hashes_are_invariant_under_multiset_permutation() {
    // Two documents differing only in the order of tags, rules, where
    // predicates, and data_contracts entries.
    let doc_forward = r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "perm.v1",
    "name": "Permutation",
    "scope": { "kind": "global" },
    "tags": ["a", "b"],
    "framework_mappings": [
      { "framework": "A", "control": "1" },
      { "framework": "B", "control": "2", "coverage": "partial" }
    ],
    "data_contracts": [
      { "dataset": "core:entitlement_assignments", "version": 1 },
      { "dataset": "core:identities", "version": 1 }
    ],
    "rules": [
      {
        "key": "RA",
        "title": "RA",
        "severity": "low",
        "monitoring": { "status": "automated" },
        "required_data": ["core:entitlement_assignments", "core:identities"],
        "parameters": { "defaults": { "max": 0 } },
        "check": {
          "type": "dataset.join_count_compare",
          "left": { "dataset": "core:identities", "key_path": "/email" },
          "right": { "dataset": "core:entitlement_assignments", "key_path": "/identity/email" },
          "where": [
            { "left_path": "/email", "op": "exists" },
            { "right_path": "/entitlement/tags", "op": "contains", "value": "admin" }
          ],
          "compare": { "op": "lte", "value_param": "max" }
        }
      },
      {
        "key": "RB",
        "title": "RB",
        "severity": "low",
        "monitoring": { "status": "manual" },
        "required_data": []
      }
    ]
  }
}"#;
    let doc_permuted = r#"{
  "schema_version": 1,
  "kind": "opensspm.ruleset",
  "ruleset": {
    "key": "perm.v1",
    "name": "Permutation",
    "scope": { "kind": "global" },
    "status": "active",
    "tags": ["b", "a"],
    "framework_mappings": [
      { "framework": "B", "control": "2", "coverage": "partial" },
      { "framework": "A", "control": "1", "coverage": "supporting" }
    ],
    "data_contracts": [
      { "dataset": "core:identities", "version": 1 },
      { "dataset": "core:entitlement_assignments", "version": 1 }
    ],
    "rules": [
      {
        "key": "RB",
        "title": "RB",
        "severity": "low",
        "monitoring": { "status": "manual" },
        "required_data": []
      },
      {
        "key": "RA",
        "title": "RA",
        "severity": "low",
        "monitoring": { "status": "automated" },
        "required_data": ["core:identities", "core:entitlement_assignments"],
        "parameters": { "defaults": { "max": 0 } },
        "check": {
          "type": "dataset.join_count_compare",
          "left": { "dataset": "core:identities", "key_path": "/email" },
          "right": { "dataset": "core:entitlement_assignments", "key_path": "/identity/email" },
          "where": [
            { "right_path": "/entitlement/tags", "op": "contains", "value": "admin" },
            { "left_path": "/email", "op": "exists" }
          ],
          "compare": { "op": "lte", "value_param": "max" }
        }
      }
    ]
  }
}"#;

    let hash_of = |doc: &str| {
        let tmp = scratch_repo();
        write_spec(tmp.path(), "specs/rulesets/perm.json", doc);
        let result = compile_repo(tmp.path()).expect("compile permuted repo");
        result.descriptor.rulesets[0].hash.clone()
    };

    assert_eq!(hash_of(doc_forward), hash_of(doc_permuted));
}

#[test]
fn build_writes_canonical_dist_tree() {
    let tmp = tempdir().unwrap();
    copy_tree(&fixture_repo(), tmp.path());

    let opts = BuildOptions::new(tmp.path());
    build(&opts, &CancelToken::new()).expect("build example repo");

    let dist = tmp.path().join("dist");
    for rel in [
        "descriptor.v1.json",
        "index/artifacts.json",
        "index/requirements.json",
        "index/dictionary.compiled.json",
        "compiled/rulesets/example.count.v1.json",
        "compiled/datasets/okta_log-streams.v1.json",
        "compiled/connectors/okta.json",
        "compiled/profiles/default.json",
        "compiled/dictionary.json",
    ] {
        let path = dist.join(rel);
        assert!(path.is_file(), "missing {rel}");
        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'), "{rel} must end with newline");
        serde_json::from_slice::<serde_json::Value>(&bytes).expect("valid JSON");
    }

    // Docs mirror.
    assert!(tmp.path().join("docs/descriptor.v1.json").is_file());
    assert!(tmp
        .path()
        .join("docs/metaschema/opensspm.ruleset.schema.json")
        .is_file());

    // The persisted descriptor's bytes (minus the newline) hash back to
    // themselves being canonical: parsing and re-canonicalizing is identity.
    let bytes = fs::read(dist.join("descriptor.v1.json")).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let recanonical = osspec_core::canonical_json_bytes(&value).unwrap();
    assert_eq!(&bytes[..bytes.len() - 1], &recanonical[..]);
}

#[test]
fn compile_does_not_write_output() {
    let tmp = tempdir().unwrap();
    copy_tree(&fixture_repo(), tmp.path());
    compile_repo(tmp.path()).expect("compile");
    assert!(!tmp.path().join("dist").exists());
}
