//! JCS (JSON Canonicalization Scheme) helpers.

use serde_json::Value;

use super::CanonicalizeError;

/// Convert a JSON value to JCS (RFC 8785) bytes.
///
/// Deterministic output: keys sorted lexicographically by UTF-16 code units,
/// no whitespace, shortest-form IEEE 754 number rendering. Integer literals
/// stay integers.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, CanonicalizeError> {
    serde_jcs::to_vec(value).map_err(|e| CanonicalizeError::Serialize {
        message: e.to_string(),
    })
}
