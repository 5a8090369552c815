//! Cross-document semantic validation.
//!
//! Runs after schema validation and normalization, over the whole parsed
//! bundle. Every rule collects into one violation list; nothing short-circuits
//! except per-rule follow-ups that would be meaningless (a rule whose
//! required check is missing skips check-level validation).
//!
//! Violations carry the repo-relative source path and, where applicable, the
//! rule key, so a multi-line report reads back to the offending document.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{
    Check, CheckType, ConnectorManifestDoc, DatasetContractDoc, DatasetContractRef, DictionaryDoc,
    MonitoringStatus, Predicate, ProfileDoc, Rule, RulesetDoc, Scope, ScopeKind, VersionRecord,
};


mod violation;

pub use violation::{PredicateLocus, SemanticViolation};

/// A parsed document plus its repo-relative source path.
#[derive(Debug, Clone)]
pub struct SpecSource<T> {
    pub path: String,
    pub doc: T,
}

impl<T> SpecSource<T> {
    pub fn new(path: impl Into<String>, doc: T) -> Self {
        Self {
            path: path.into(),
            doc,
        }
    }
}

/// The fully parsed and normalized repository contents.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    pub version: VersionRecord,
    pub dictionary: Option<SpecSource<DictionaryDoc>>,
    pub rulesets: Vec<SpecSource<RulesetDoc>>,
    pub dataset_contracts: Vec<SpecSource<DatasetContractDoc>>,
    pub connectors: Vec<SpecSource<ConnectorManifestDoc>>,
    pub profiles: Vec<SpecSource<ProfileDoc>>,
}

/// Validate the bundle and return every violation found.
pub fn validate(bundle: &Bundle) -> Vec<SemanticViolation> {
    let mut violations = Vec::new();

    let mut seen_ruleset_keys: BTreeMap<&str, &str> = BTreeMap::new();
    for rs in &bundle.rulesets {
        let key = rs.doc.ruleset.key.as_str();
        match seen_ruleset_keys.get(key) {
            Some(first) => violations.push(SemanticViolation::DuplicateRulesetKey {
                key: key.to_string(),
                first: (*first).to_string(),
                second: rs.path.clone(),
            }),
            None => {
                seen_ruleset_keys.insert(key, rs.path.as_str());
            }
        }

        validate_scope(&rs.path, &rs.doc.ruleset.scope, &mut violations);
        validate_ruleset_rules(&rs.path, &rs.doc, &mut violations);
    }

    let mut seen_contracts: BTreeMap<String, &str> = BTreeMap::new();
    for dc in &bundle.dataset_contracts {
        let key = format!("{}@{}", dc.doc.dataset.key, dc.doc.dataset.version);
        match seen_contracts.get(&key) {
            Some(first) => violations.push(SemanticViolation::DuplicateDatasetContract {
                key,
                first: (*first).to_string(),
                second: dc.path.clone(),
            }),
            None => {
                seen_contracts.insert(key, dc.path.as_str());
            }
        }
    }

    violations
}

fn validate_scope(path: &str, scope: &Scope, violations: &mut Vec<SemanticViolation>) {
    let connector_kind = scope
        .connector_kind
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match scope.kind {
        ScopeKind::ConnectorInstance => {
            if connector_kind.is_none() {
                violations.push(SemanticViolation::ScopeConnectorKindRequired {
                    path: path.to_string(),
                });
            }
        }
        ScopeKind::Global => {
            if connector_kind.is_some() {
                violations.push(SemanticViolation::ScopeConnectorKindForbidden {
                    path: path.to_string(),
                });
            }
        }
    }
}

/// Per-ruleset lookup over its `data_contracts`: distinct versions per
/// dataset for ambiguity checks, and the declared (dataset, version) pairs
/// for existence checks.
struct ContractIndex {
    versions_by_dataset: BTreeMap<String, BTreeSet<u32>>,
    pairs: BTreeSet<(String, u32)>,
}

impl ContractIndex {
    fn new(contracts: &[DatasetContractRef]) -> Self {
        let mut versions_by_dataset: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
        let mut pairs = BTreeSet::new();
        for dc in contracts {
            versions_by_dataset
                .entry(dc.dataset.clone())
                .or_default()
                .insert(dc.version);
            pairs.insert((dc.dataset.clone(), dc.version));
        }
        Self {
            versions_by_dataset,
            pairs,
        }
    }

    fn distinct_versions(&self, dataset: &str) -> usize {
        self.versions_by_dataset
            .get(dataset)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    fn has_pair(&self, dataset: &str, version: u32) -> bool {
        self.pairs.contains(&(dataset.to_string(), version))
    }
}

fn validate_ruleset_rules(path: &str, doc: &RulesetDoc, violations: &mut Vec<SemanticViolation>) {
    let contracts = ContractIndex::new(&doc.ruleset.data_contracts);

    let mut seen_rule_keys: BTreeSet<&str> = BTreeSet::new();
    for rule in &doc.ruleset.rules {
        if !seen_rule_keys.insert(rule.key.as_str()) {
            violations.push(SemanticViolation::DuplicateRuleKey {
                path: path.to_string(),
                rule: rule.key.clone(),
            });
        }
        validate_rule(path, rule, &contracts, violations);
    }
}

fn validate_rule(
    path: &str,
    rule: &Rule,
    contracts: &ContractIndex,
    violations: &mut Vec<SemanticViolation>,
) {
    // Every parameters.schema key needs a default to fall back on.
    if let Some(params) = &rule.parameters {
        if let Some(schema) = &params.schema {
            for key in schema.keys() {
                match &params.defaults {
                    None => violations.push(SemanticViolation::ParameterSchemaNoDefaults {
                        path: path.to_string(),
                        rule: rule.key.clone(),
                        key: key.clone(),
                    }),
                    Some(defaults) if !defaults.contains_key(key) => {
                        violations.push(SemanticViolation::ParameterSchemaKeyMissing {
                            path: path.to_string(),
                            rule: rule.key.clone(),
                            key: key.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }

    match rule.monitoring.status {
        MonitoringStatus::Automated | MonitoringStatus::Partial => {
            if rule.check.is_none() {
                violations.push(SemanticViolation::CheckRequired {
                    path: path.to_string(),
                    rule: rule.key.clone(),
                    status: rule.monitoring.status,
                });
                // Without a check, check-level validation has nothing to say.
                return;
            }
        }
        MonitoringStatus::Manual | MonitoringStatus::Unsupported => {
            if let Some(check) = &rule.check {
                if check.check_type != CheckType::ManualAttestation {
                    violations.push(SemanticViolation::ManualCheckTypeForbidden {
                        path: path.to_string(),
                        rule: rule.key.clone(),
                        status: rule.monitoring.status,
                    });
                }
            }
        }
    }

    if let Some(check) = &rule.check {
        validate_check(path, rule, check, contracts, violations);
    }
}

fn validate_check(
    path: &str,
    rule: &Rule,
    check: &Check,
    contracts: &ContractIndex,
    violations: &mut Vec<SemanticViolation>,
) {
    let dataset_empty = check
        .dataset
        .as_deref()
        .map(str::trim)
        .map_or(true, str::is_empty);

    // Per-variant required/forbidden fields, derived from the check's tag.
    match check.check_type {
        CheckType::ManualAttestation => {}
        CheckType::DatasetFieldCompare => {
            if dataset_empty {
                violations.push(requires(path, rule, check, "check.dataset"));
            }
            if check.assert.is_none() {
                violations.push(requires(path, rule, check, "check.assert"));
            }
            if check.compare.is_some() {
                violations.push(forbids(path, rule, check, "check.compare"));
            }
            if check.left.is_some() || check.right.is_some() {
                violations.push(forbids(path, rule, check, "check.left/check.right"));
            }
        }
        CheckType::DatasetCountCompare => {
            if dataset_empty {
                violations.push(requires(path, rule, check, "check.dataset"));
            }
            if check.compare.is_none() {
                violations.push(requires(path, rule, check, "check.compare"));
            }
            if check.assert.is_some() || check.expect.is_some() {
                violations.push(forbids(path, rule, check, "check.assert/check.expect"));
            }
            if check.left.is_some() || check.right.is_some() {
                violations.push(forbids(path, rule, check, "check.left/check.right"));
            }
        }
        CheckType::DatasetJoinCountCompare => {
            let side_missing = |side: &Option<crate::spec::JoinSide>| {
                side.as_ref().map_or(true, |s| {
                    s.dataset.trim().is_empty() || s.key_path.trim().is_empty()
                })
            };
            if side_missing(&check.left) {
                violations.push(requires(
                    path,
                    rule,
                    check,
                    "check.left.dataset and check.left.key_path",
                ));
            }
            if side_missing(&check.right) {
                violations.push(requires(
                    path,
                    rule,
                    check,
                    "check.right.dataset and check.right.key_path",
                ));
            }
            if check.compare.is_none() {
                violations.push(requires(path, rule, check, "check.compare"));
            }
            if !dataset_empty {
                violations.push(forbids(path, rule, check, "check.dataset"));
            }
            if check.assert.is_some() || check.expect.is_some() {
                violations.push(forbids(path, rule, check, "check.assert/check.expect"));
            }
        }
    }

    // Predicate structural constraints.
    if check.check_type == CheckType::DatasetJoinCountCompare {
        for (i, p) in check.r#where.iter().enumerate() {
            validate_join_predicate(path, &rule.key, PredicateLocus::Where(i), p, violations);
        }
    } else {
        for (i, p) in check.r#where.iter().enumerate() {
            validate_predicate(path, &rule.key, PredicateLocus::Where(i), p, violations);
        }
        if let Some(assert) = &check.assert {
            validate_predicate(path, &rule.key, PredicateLocus::Assert, assert, violations);
        }
    }

    // Required-data coverage.
    let required: BTreeSet<&str> = rule.required_data.iter().map(String::as_str).collect();
    for dataset in check.referenced_datasets() {
        if !required.contains(dataset) {
            violations.push(SemanticViolation::RequiredDataMissing {
                path: path.to_string(),
                rule: rule.key.clone(),
                dataset: dataset.to_string(),
            });
        }
    }

    // Dataset version resolution and ambiguity.
    let declared_version = check.dataset_version.filter(|v| *v > 0);
    for dataset in check.referenced_datasets() {
        if declared_version.is_none() && contracts.distinct_versions(dataset) > 1 {
            violations.push(SemanticViolation::DatasetVersionAmbiguous {
                path: path.to_string(),
                rule: rule.key.clone(),
                dataset: dataset.to_string(),
            });
        }
        if let Some(version) = declared_version {
            if !contracts.has_pair(dataset, version) {
                violations.push(SemanticViolation::DatasetVersionUndeclared {
                    path: path.to_string(),
                    rule: rule.key.clone(),
                    dataset: dataset.to_string(),
                    version,
                });
            }
        }
    }

    // Every value_param must resolve to a parameter default.
    let value_params = check.value_params();
    if !value_params.is_empty() {
        let defaults = rule
            .parameters
            .as_ref()
            .and_then(|p| p.defaults.as_ref());
        match defaults {
            None => violations.push(SemanticViolation::ValueParamNoDefaults {
                path: path.to_string(),
                rule: rule.key.clone(),
            }),
            Some(defaults) => {
                for vp in &value_params {
                    if !defaults.contains_key(vp) {
                        violations.push(SemanticViolation::ValueParamUnknown {
                            path: path.to_string(),
                            rule: rule.key.clone(),
                            name: vp.clone(),
                        });
                    }
                }
            }
        }
    }

    if let Some(compare) = &check.compare {
        let has_value = compare.value.is_some();
        let has_param = compare
            .value_param
            .as_deref()
            .map(str::trim)
            .is_some_and(|s| !s.is_empty());
        if has_value == has_param {
            violations.push(SemanticViolation::CompareExactlyOne {
                path: path.to_string(),
                rule: rule.key.clone(),
            });
        }
    }
}

fn requires(path: &str, rule: &Rule, check: &Check, field: &'static str) -> SemanticViolation {
    SemanticViolation::CheckFieldRequired {
        path: path.to_string(),
        rule: rule.key.clone(),
        check_type: check.check_type,
        field,
    }
}

fn forbids(path: &str, rule: &Rule, check: &Check, field: &'static str) -> SemanticViolation {
    SemanticViolation::CheckFieldForbidden {
        path: path.to_string(),
        rule: rule.key.clone(),
        check_type: check.check_type,
        field,
    }
}

fn validate_predicate(
    path: &str,
    rule: &str,
    locus: PredicateLocus,
    p: &Predicate,
    violations: &mut Vec<SemanticViolation>,
) {
    if p.path.as_deref().map(str::trim).map_or(true, str::is_empty) {
        violations.push(SemanticViolation::PredicateMissingPath {
            path: path.to_string(),
            rule: rule.to_string(),
            locus,
        });
    }
    if has_text(&p.left_path) || has_text(&p.right_path) {
        violations.push(SemanticViolation::PredicateJoinPathsForbidden {
            path: path.to_string(),
            rule: rule.to_string(),
            locus,
        });
    }
    validate_predicate_value(path, rule, locus, p, violations);
}

fn validate_join_predicate(
    path: &str,
    rule: &str,
    locus: PredicateLocus,
    p: &Predicate,
    violations: &mut Vec<SemanticViolation>,
) {
    if has_text(&p.path) {
        violations.push(SemanticViolation::PredicatePathForbidden {
            path: path.to_string(),
            rule: rule.to_string(),
            locus,
        });
    }
    if has_text(&p.left_path) == has_text(&p.right_path) {
        violations.push(SemanticViolation::PredicateExactlyOneSide {
            path: path.to_string(),
            rule: rule.to_string(),
            locus,
        });
    }
    validate_predicate_value(path, rule, locus, p, violations);
}

fn validate_predicate_value(
    path: &str,
    rule: &str,
    locus: PredicateLocus,
    p: &Predicate,
    violations: &mut Vec<SemanticViolation>,
) {
    // An explicitly-null value counts as absent here; the normalizer scrubs
    // it, and direct callers get the same reading.
    let has_value = matches!(&p.value, Some(v) if !v.is_null());
    let has_param = has_text(&p.value_param);
    if p.op.is_presence() {
        if has_value || has_param {
            violations.push(SemanticViolation::PredicateValueForbidden {
                path: path.to_string(),
                rule: rule.to_string(),
                locus,
                op: p.op,
            });
        }
        return;
    }
    if has_value && has_param {
        violations.push(SemanticViolation::PredicateValueExclusive {
            path: path.to_string(),
            rule: rule.to_string(),
            locus,
        });
    }
}

fn has_text(v: &Option<String>) -> bool {
    v.as_deref().map(str::trim).is_some_and(|s| !s.is_empty())
}
