//! Document structs for the five spec kinds and the repo-level records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::enums::{
    CheckType, CompareOp, ErrorPolicy, FieldCompareMatch, FieldCompareOnEmpty, FrameworkCoverage,
    MonitoringStatus, OnUnmatchedLeft, Operator, ReferenceType, RemediationEffort, ScopeKind,
    Severity,
};

/// Minimal header decoded first from every spec file to learn its kind.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub schema_version: u32,
    pub kind: String,
}

/// The repo-root `version.json` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub project: String,
    pub repo: String,
    pub spec_version: String,
    pub schema_version: u32,
    pub generator_min_version: String,
}

/// The repo-root dictionary document: enum lookup tables keyed by enum name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryDoc {
    pub schema_version: u32,
    pub kind: String,
    pub dictionary: DictionaryBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryBody {
    pub enums: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<ReferenceType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub version: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetDoc {
    pub schema_version: u32,
    pub kind: String,
    pub ruleset: Ruleset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub key: String,
    pub name: String,
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub framework_mappings: Vec<FrameworkMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RulesetRequirements>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_contracts: Vec<DatasetContractRef>,
    pub rules: Vec<Rule>,
}

/// A `{dataset, version}` pair as referenced by manifests and indexes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetRef {
    pub dataset: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkMapping {
    pub framework: String,
    pub control: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<FrameworkCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetRequirements {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A ruleset's declaration that it relies on a dataset at a given version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetContractRef {
    pub dataset: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub key: String,
    pub title: String,
    pub severity: Severity,
    pub monitoring: Monitoring,
    pub required_data: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<Check>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub framework_mappings: Vec<FrameworkMapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitoring {
    pub status: MonitoringStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BTreeMap<String, ParameterSchema>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_resources: Option<AffectedResources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_templates: Option<EvidenceSummaryTemplates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedResources {
    pub dataset: String,
    pub id_field: String,
    pub display_field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSummaryTemplates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_applicable: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remediation {
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<RemediationEffort>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
}

/// The machine-evaluable body of a rule.
///
/// `check_type` is the tag of the union; the per-variant required/forbidden
/// field rules live in the semantic validator, which matches on the tag and
/// reports violations instead of dropping fields at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    #[serde(rename = "type")]
    pub check_type: CheckType,

    // Common to all check types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_missing_dataset: Option<ErrorPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_permission_denied: Option<ErrorPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_sync_error: Option<ErrorPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    // dataset.field_compare, dataset.count_compare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub r#where: Vec<Predicate>,

    // dataset.field_compare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<FieldCompareExpect>,

    // dataset.count_compare, dataset.join_count_compare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare: Option<Compare>,

    // dataset.join_count_compare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<JoinSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<JoinSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_unmatched_left: Option<OnUnmatchedLeft>,
}

impl Check {
    /// An empty check of the given type; callers fill in the variant fields.
    pub fn new(check_type: CheckType) -> Self {
        Check {
            check_type,
            dataset_version: None,
            on_missing_dataset: None,
            on_permission_denied: None,
            on_sync_error: None,
            notes: None,
            dataset: None,
            r#where: Vec::new(),
            assert: None,
            expect: None,
            compare: None,
            left: None,
            right: None,
            on_unmatched_left: None,
        }
    }

    /// Dataset names this check reads, in left-to-right declaration order.
    pub fn referenced_datasets(&self) -> Vec<&str> {
        match self.check_type {
            CheckType::DatasetFieldCompare | CheckType::DatasetCountCompare => self
                .dataset
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .into_iter()
                .collect(),
            CheckType::DatasetJoinCountCompare => {
                let mut out = Vec::new();
                for side in [self.left.as_ref(), self.right.as_ref()].into_iter().flatten() {
                    if !side.dataset.trim().is_empty() {
                        out.push(side.dataset.as_str());
                    }
                }
                out
            }
            CheckType::ManualAttestation => Vec::new(),
        }
    }

    /// Sorted, deduplicated `value_param` names used by `where`, `assert`,
    /// and `compare`. Names are trimmed before collection.
    pub fn value_params(&self) -> Vec<String> {
        let mut set = std::collections::BTreeSet::new();
        let mut add = |value_param: &Option<String>| {
            if let Some(vp) = value_param.as_deref().map(str::trim) {
                if !vp.is_empty() {
                    set.insert(vp.to_string());
                }
            }
        };
        for p in &self.r#where {
            add(&p.value_param);
        }
        if let Some(assert) = &self.assert {
            add(&assert.value_param);
        }
        if let Some(compare) = &self.compare {
            add(&compare.value_param);
        }
        set.into_iter().collect()
    }
}

/// A single query predicate.
///
/// Non-join predicates address one row (`path`); join predicates address one
/// side of the join (`left_path` xor `right_path`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_path: Option<String>,
    pub op: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_param: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compare {
    pub op: CompareOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_param: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCompareExpect {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<FieldCompareMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selected: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_empty: Option<FieldCompareOnEmpty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSide {
    pub dataset: String,
    pub key_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetContractDoc {
    pub schema_version: u32,
    pub kind: String,
    pub dataset: DatasetContract,
}

/// A versioned dataset schema. The `schema` block is carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetContract {
    pub key: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_display: Option<String>,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorManifestDoc {
    pub schema_version: u32,
    pub kind: String,
    pub connector: ConnectorManifest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorManifest {
    pub kind: String,
    pub name: String,
    pub provides: Vec<DatasetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDoc {
    pub schema_version: u32,
    pub kind: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rulesets: Vec<ProfileRulesetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRulesetRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
