//! Compile-pipeline error taxonomy, in pipeline order.

use std::path::PathBuf;

use crate::canonicalize::CanonicalizeError;
use crate::loader::LoaderError;
use crate::schema::SchemaError;
use crate::semantic::SemanticViolation;

/// Any failure that aborts a compile run.
///
/// IO, header, schema, and parse errors are fatal for the first file they
/// hit. Semantic violations are the exception: they accumulate across the
/// whole bundle and surface together as one [`CompileError::Validation`].
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Header { path: String, message: String },

    #[error("{path}: {source}")]
    Schema { path: String, source: SchemaError },

    #[error("{path}: parse {kind}: {source}")]
    Parse {
        path: String,
        kind: String,
        source: serde_json::Error,
    },

    #[error("invalid version.json (missing required fields)")]
    InvalidVersion,

    #[error("{}", format_violations(.0))]
    Validation(Vec<SemanticViolation>),

    #[error("{path}: hash: {source}")]
    Hash {
        path: String,
        source: CanonicalizeError,
    },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Registry(#[from] SchemaError),
}

fn format_violations(violations: &[SemanticViolation]) -> String {
    let mut out = String::from("validation failed:");
    for v in violations {
        out.push_str("\n - ");
        out.push_str(&v.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_violation() {
        let err = CompileError::Validation(vec![
            SemanticViolation::ScopeConnectorKindForbidden {
                path: "a.json".to_string(),
            },
            SemanticViolation::ScopeConnectorKindRequired {
                path: "b.json".to_string(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("validation failed:"));
        assert!(text.contains("\n - a.json:"));
        assert!(text.contains("\n - b.json:"));
    }
}
