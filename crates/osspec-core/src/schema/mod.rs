//! JSON Schema registry: one compiled metaschema per document kind.
//!
//! Schemas are compiled once at load and are read-only afterwards, so a
//! registry can be shared across compile runs. Validation happens on the raw
//! parsed JSON value, before the typed parse, so schema diagnostics point at
//! the document as written.

use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::spec::{
    KIND_CONNECTOR_MANIFEST, KIND_DATASET_CONTRACT, KIND_DICTIONARY, KIND_PROFILE, KIND_RULESET,
};

/// A known document kind and its metaschema filename.
pub struct KindSchema {
    pub kind: &'static str,
    pub filename: &'static str,
}

pub const KNOWN_SCHEMAS: &[KindSchema] = &[
    KindSchema {
        kind: KIND_RULESET,
        filename: "opensspm.ruleset.schema.json",
    },
    KindSchema {
        kind: KIND_DATASET_CONTRACT,
        filename: "opensspm.dataset_contract.schema.json",
    },
    KindSchema {
        kind: KIND_CONNECTOR_MANIFEST,
        filename: "opensspm.connector_manifest.schema.json",
    },
    KindSchema {
        kind: KIND_PROFILE,
        filename: "opensspm.profile.schema.json",
    },
    KindSchema {
        kind: KIND_DICTIONARY,
        filename: "opensspm.dictionary.schema.json",
    },
];

/// Schema registry errors.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("reading schema {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing schema {path}: {source}")]
    ParseSchema {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("compiling schema {filename}: {message}")]
    Compile { filename: String, message: String },

    #[error("no schema registered for kind {kind:?}")]
    UnknownKind { kind: String },

    #[error("document is not valid JSON: {source}")]
    DecodeDocument { source: serde_json::Error },

    /// Schema validation failure; `detail` lists one violation per line with
    /// its JSON pointer.
    #[error("schema validation failed for kind {kind:?}:\n{detail}")]
    Validation { kind: String, detail: String },
}

pub struct SchemaRegistry {
    schemas: BTreeMap<&'static str, JSONSchema>,
}

impl SchemaRegistry {
    /// Load and compile one schema per known kind from `metaschema_dir`.
    pub fn load(metaschema_dir: &Path) -> Result<Self, SchemaError> {
        let mut schemas = BTreeMap::new();
        for ks in KNOWN_SCHEMAS {
            let path = metaschema_dir.join(ks.filename);
            let bytes = fs::read(&path).map_err(|source| SchemaError::Read {
                path: path.clone(),
                source,
            })?;
            let schema: Value =
                serde_json::from_slice(&bytes).map_err(|source| SchemaError::ParseSchema {
                    path: path.clone(),
                    source,
                })?;
            let compiled = JSONSchema::compile(&schema).map_err(|e| SchemaError::Compile {
                filename: ks.filename.to_string(),
                message: e.to_string(),
            })?;
            schemas.insert(ks.kind, compiled);
        }
        debug!(count = schemas.len(), "schema registry loaded");
        Ok(Self { schemas })
    }

    /// Validate raw JSON bytes against the schema registered for `kind`.
    ///
    /// Decoding goes through `serde_json::Value`, which keeps integer
    /// literals as integers; no float widening before validation.
    pub fn validate_kind(&self, kind: &str, bytes: &[u8]) -> Result<(), SchemaError> {
        let schema = self.schemas.get(kind).ok_or_else(|| SchemaError::UnknownKind {
            kind: kind.to_string(),
        })?;
        let doc: Value =
            serde_json::from_slice(bytes).map_err(|source| SchemaError::DecodeDocument { source })?;
        if let Err(errors) = schema.validate(&doc) {
            let detail = errors
                .map(|e| format!("{}: {}", pointer_of(&e), e))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(SchemaError::Validation {
                kind: kind.to_string(),
                detail,
            });
        }
        Ok(())
    }
}

fn pointer_of(err: &jsonschema::ValidationError<'_>) -> String {
    let pointer = err.instance_path.to_string();
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer
    }
}
