//! Typed model for Open SSPM spec documents.
//!
//! Field layout mirrors the wire format: optional fields skip serialization
//! when absent so the canonical form stays minimal, and every value the
//! normalizer materializes (defaults, sorted multisets) serializes exactly as
//! stored. Serialization of any document in this module is the input to
//! [`crate::canonicalize::hash_object`].

mod compiled;
mod dataset_version;
mod enums;
mod model;

pub use compiled::{
    Artifact, ArtifactsIndex, CodegenFile, CodegenRequest, CodegenResponse, Compiled, Descriptor,
    DescriptorIndex, RequirementsIndex, RuleMonitoring, RuleRequirement, RulesetRequirement,
};
pub use dataset_version::effective_dataset_version;
pub use enums::{
    CheckType, CompareOp, ErrorPolicy, FieldCompareMatch, FieldCompareOnEmpty, FrameworkCoverage,
    MonitoringStatus, OnUnmatchedLeft, Operator, ReferenceType, RemediationEffort, ScopeKind,
    Severity,
};
pub use model::{
    AffectedResources, Check, Compare, ConnectorManifest, ConnectorManifestDoc, DatasetContract,
    DatasetContractDoc, DatasetContractRef, DatasetRef, DictionaryBody, DictionaryDoc, Evidence,
    EvidenceSummaryTemplates, FieldCompareExpect, FrameworkMapping, Header, JoinSide, Lifecycle,
    Monitoring, ParameterSchema, Parameters, Predicate, Profile, ProfileDoc, ProfileRulesetRef,
    Reference, Remediation, Rule, Ruleset, RulesetDoc, RulesetRequirements, Scope, Source,
    VersionRecord,
};

/// Supported document header version.
pub const SCHEMA_VERSION: u32 = 1;

pub const KIND_RULESET: &str = "opensspm.ruleset";
pub const KIND_DATASET_CONTRACT: &str = "opensspm.dataset_contract";
pub const KIND_CONNECTOR_MANIFEST: &str = "opensspm.connector_manifest";
pub const KIND_PROFILE: &str = "opensspm.profile";
pub const KIND_DICTIONARY: &str = "opensspm.dictionary";

pub const KIND_VERSION: &str = "opensspm.version";
pub const KIND_DESCRIPTOR: &str = "opensspm.descriptor";
pub const KIND_ARTIFACTS_INDEX: &str = "opensspm.artifacts_index";
pub const KIND_REQUIREMENTS_INDEX: &str = "opensspm.requirements_index";
pub const KIND_CODEGEN_REQUEST: &str = "opensspm.codegen_request";
pub const KIND_CODEGEN_RESPONSE: &str = "opensspm.codegen_response";
