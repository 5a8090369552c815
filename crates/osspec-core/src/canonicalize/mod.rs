//! Canonical JSON (RFC 8785 / JCS) serialization and content hashing.
//!
//! Every persisted artifact and every content address in the descriptor is
//! derived from the JCS encoding: object keys sorted by UTF-16 code units,
//! shortest-form number rendering, no insignificant whitespace. Hashing the
//! canonical bytes makes document identity independent of input formatting
//! and host platform.

mod digest;
mod json;


pub use digest::sha256_hex;
pub use json::canonical_json_bytes;

use serde::Serialize;

/// Canonicalization failures.
///
/// Unreachable for values that round-tripped through `serde_json`; surfaced
/// so callers never persist a partial artifact.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalizeError {
    /// The value could not be serialized to canonical JSON.
    #[error("canonical json serialization failed: {message}")]
    Serialize { message: String },
}

/// Serialize a value to JCS bytes and return `(sha256_hex, canonical_bytes)`.
///
/// Callers persist the bytes and use the digest as the content address.
pub fn hash_object<T: Serialize>(value: &T) -> Result<(String, Vec<u8>), CanonicalizeError> {
    let canonical = serde_jcs::to_vec(value).map_err(|e| CanonicalizeError::Serialize {
        message: e.to_string(),
    })?;
    Ok((sha256_hex(&canonical), canonical))
}
