//! Compiled output model: descriptor, indexes, and the codegen protocol.

use serde::{Deserialize, Serialize};

use super::enums::{CheckType, MonitoringStatus};
use super::model::{
    ConnectorManifestDoc, DatasetContractDoc, DatasetRef, DictionaryDoc, ProfileDoc, RulesetDoc,
    Scope, VersionRecord,
};

/// One entry in the flat artifacts index: every compiled document with its
/// identity key and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: String,
    pub key: String,
    pub source_path: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsIndex {
    pub schema_version: u32,
    pub kind: String,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsIndex {
    pub schema_version: u32,
    pub kind: String,
    pub rulesets: Vec<RulesetRequirement>,
}

/// Per-ruleset roll-up of what its rules need to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetRequirement {
    pub ruleset_key: String,
    pub status: String,
    pub scope: Scope,
    pub datasets: Vec<DatasetRef>,
    pub check_types: Vec<CheckType>,
    pub value_params: Vec<String>,
    pub rules: Vec<RuleRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRequirement {
    pub rule_key: String,
    pub is_manual: bool,
    pub datasets: Vec<DatasetRef>,
    pub check_type: Option<CheckType>,
    pub value_params: Vec<String>,
    pub monitoring: RuleMonitoring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMonitoring {
    pub status: MonitoringStatus,
}

/// A compiled document plus its provenance and content address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compiled<T> {
    pub source_path: String,
    pub hash: String,
    pub object: T,
}

/// The single deterministic output of a compile run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub schema_version: u32,
    pub kind: String,
    pub version: VersionRecord,
    pub dictionary: Compiled<DictionaryDoc>,
    pub rulesets: Vec<Compiled<RulesetDoc>>,
    pub dataset_contracts: Vec<Compiled<DatasetContractDoc>>,
    pub connectors: Vec<Compiled<ConnectorManifestDoc>>,
    pub profiles: Vec<Compiled<ProfileDoc>>,
    pub index: DescriptorIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorIndex {
    pub requirements: RequirementsIndex,
    pub artifacts: ArtifactsIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenRequest {
    pub schema_version: u32,
    pub kind: String,
    pub language: String,
    pub descriptor: Descriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenResponse {
    pub schema_version: u32,
    pub kind: String,
    pub files: Vec<CodegenFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenFile {
    pub path: String,
    pub content: String,
}
