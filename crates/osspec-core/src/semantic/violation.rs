//! Semantic violation taxonomy.

use std::fmt;

use crate::spec::{CheckType, MonitoringStatus, Operator};

/// Where inside a check a predicate violation was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateLocus {
    /// `check.where[index]`
    Where(usize),
    /// `check.assert`
    Assert,
}

impl fmt::Display for PredicateLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateLocus::Where(i) => write!(f, "check.where[{i}]"),
            PredicateLocus::Assert => f.write_str("check.assert"),
        }
    }
}

/// One semantic rule firing against one document.
///
/// Message wording is part of the tool's contract: downstream tooling greps
/// compile output for these fragments, so changes here are breaking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticViolation {
    #[error("duplicate ruleset.key {key:?} in {first} and {second}")]
    DuplicateRulesetKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("duplicate dataset (key,version) {key:?} in {first} and {second}")]
    DuplicateDatasetContract {
        key: String,
        first: String,
        second: String,
    },

    #[error("{path}: scope.kind=connector_instance requires scope.connector_kind")]
    ScopeConnectorKindRequired { path: String },

    #[error("{path}: scope.kind=global forbids scope.connector_kind")]
    ScopeConnectorKindForbidden { path: String },

    #[error("{path}: duplicate rule.key {rule:?}")]
    DuplicateRuleKey { path: String, rule: String },

    #[error("{path}: rule {rule:?}: monitoring.status={status} requires rule.check")]
    CheckRequired {
        path: String,
        rule: String,
        status: MonitoringStatus,
    },

    #[error("{path}: rule {rule:?}: monitoring.status={status} only allows check.type=manual.attestation or check omission")]
    ManualCheckTypeForbidden {
        path: String,
        rule: String,
        status: MonitoringStatus,
    },

    #[error("{path}: rule {rule:?}: {check_type} requires {field}")]
    CheckFieldRequired {
        path: String,
        rule: String,
        check_type: CheckType,
        field: &'static str,
    },

    #[error("{path}: rule {rule:?}: {check_type} forbids {field}")]
    CheckFieldForbidden {
        path: String,
        rule: String,
        check_type: CheckType,
        field: &'static str,
    },

    #[error("{path}: rule {rule:?}: {locus}: missing path")]
    PredicateMissingPath {
        path: String,
        rule: String,
        locus: PredicateLocus,
    },

    #[error("{path}: rule {rule:?}: {locus}: left_path/right_path not allowed in non-join predicate")]
    PredicateJoinPathsForbidden {
        path: String,
        rule: String,
        locus: PredicateLocus,
    },

    #[error("{path}: rule {rule:?}: {locus}: path not allowed in join predicate")]
    PredicatePathForbidden {
        path: String,
        rule: String,
        locus: PredicateLocus,
    },

    #[error("{path}: rule {rule:?}: {locus}: must set exactly one of left_path or right_path")]
    PredicateExactlyOneSide {
        path: String,
        rule: String,
        locus: PredicateLocus,
    },

    #[error("{path}: rule {rule:?}: {locus}: op={op} forbids value and value_param")]
    PredicateValueForbidden {
        path: String,
        rule: String,
        locus: PredicateLocus,
        op: Operator,
    },

    #[error("{path}: rule {rule:?}: {locus}: value and value_param are mutually exclusive")]
    PredicateValueExclusive {
        path: String,
        rule: String,
        locus: PredicateLocus,
    },

    #[error("{path}: rule {rule:?}: required_data missing dataset {dataset:?} referenced by check")]
    RequiredDataMissing {
        path: String,
        rule: String,
        dataset: String,
    },

    #[error("{path}: rule {rule:?}: dataset {dataset:?} has multiple data_contracts versions; check.dataset_version is required")]
    DatasetVersionAmbiguous {
        path: String,
        rule: String,
        dataset: String,
    },

    #[error("{path}: rule {rule:?}: check.dataset_version={version} requires ruleset.data_contracts entry for {dataset:?}@{version}")]
    DatasetVersionUndeclared {
        path: String,
        rule: String,
        dataset: String,
        version: u32,
    },

    #[error("{path}: rule {rule:?}: value_param used but parameters.defaults is missing")]
    ValueParamNoDefaults { path: String, rule: String },

    #[error("{path}: rule {rule:?}: value_param {name:?} not found in parameters.defaults")]
    ValueParamUnknown {
        path: String,
        rule: String,
        name: String,
    },

    #[error("{path}: rule {rule:?}: parameters.schema={key:?} but parameters.defaults is missing")]
    ParameterSchemaNoDefaults {
        path: String,
        rule: String,
        key: String,
    },

    #[error("{path}: rule {rule:?}: parameters.schema={key:?} not found in parameters.defaults")]
    ParameterSchemaKeyMissing {
        path: String,
        rule: String,
        key: String,
    },

    #[error("{path}: rule {rule:?}: check.compare must set exactly one of value or value_param")]
    CompareExactlyOne { path: String, rule: String },
}
