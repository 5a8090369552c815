//! Closed vocabularies of the spec model.
//!
//! Values outside these sets are rejected by the schema registry before the
//! typed parse ever runs, so the enums can stay closed. `as_str` returns the
//! wire spelling; sort comparators and diagnostics use it so ordering always
//! follows the serialized form, not declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Global,
    ConnectorInstance,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::ConnectorInstance => "connector_instance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringStatus {
    Automated,
    Partial,
    Manual,
    Unsupported,
}

impl MonitoringStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitoringStatus::Automated => "automated",
            MonitoringStatus::Partial => "partial",
            MonitoringStatus::Manual => "manual",
            MonitoringStatus::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for MonitoringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckType {
    #[serde(rename = "dataset.field_compare")]
    DatasetFieldCompare,
    #[serde(rename = "dataset.count_compare")]
    DatasetCountCompare,
    #[serde(rename = "dataset.join_count_compare")]
    DatasetJoinCountCompare,
    #[serde(rename = "manual.attestation")]
    ManualAttestation,
}

impl CheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::DatasetFieldCompare => "dataset.field_compare",
            CheckType::DatasetCountCompare => "dataset.count_compare",
            CheckType::DatasetJoinCountCompare => "dataset.join_count_compare",
            CheckType::ManualAttestation => "manual.attestation",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Exists,
    Absent,
    In,
    Contains,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Exists => "exists",
            Operator::Absent => "absent",
            Operator::In => "in",
            Operator::Contains => "contains",
        }
    }

    /// `exists` and `absent` assert presence alone and take no operand.
    pub fn is_presence(&self) -> bool {
        matches!(self, Operator::Exists | Operator::Absent)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// What a check should report when a dataset-level failure occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    Unknown,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnUnmatchedLeft {
    Ignore,
    Count,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCompareMatch {
    All,
    Any,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCompareOnEmpty {
    Pass,
    Fail,
    Unknown,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Documentation,
    Standard,
    Blog,
    Ticket,
    Other,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Documentation => "documentation",
            ReferenceType::Standard => "standard",
            ReferenceType::Blog => "blog",
            ReferenceType::Ticket => "ticket",
            ReferenceType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkCoverage {
    Direct,
    Partial,
    Supporting,
}

impl FrameworkCoverage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkCoverage::Direct => "direct",
            FrameworkCoverage::Partial => "partial",
            FrameworkCoverage::Supporting => "supporting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationEffort {
    Low,
    Medium,
    High,
}
