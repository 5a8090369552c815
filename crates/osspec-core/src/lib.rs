//! Compilation pipeline for Open SSPM spec repositories.
//!
//! The pipeline reads a repository of JSON spec documents (rulesets, dataset
//! contracts, connector manifests, profiles, plus the repo-level version and
//! dictionary records), validates them structurally and semantically,
//! normalizes them into a canonical form, and assembles a deterministic,
//! content-addressed descriptor with derived indexes.
//!
//! Stages, in order: [`loader`] walks the specs tree, [`schema`] validates
//! raw bytes per kind, [`spec`] holds the typed model, [`normalize`] makes
//! logically equal documents byte-equal, [`semantic`] collects cross-document
//! violations, [`index`] derives the requirements index, [`canonicalize`]
//! produces JCS bytes and SHA-256 content hashes, and [`compiler`] ties it
//! all together.

pub mod canonicalize;
pub mod compiler;
pub mod error;
pub mod index;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod semantic;
pub mod spec;

pub use canonicalize::{canonical_json_bytes, hash_object, sha256_hex};
pub use compiler::{build, compile, BuildOptions, CompileOptions, CompileResult};
pub use error::CompileError;
pub use loader::{load_spec_files, CancelToken, LoadedFile, MAX_SPEC_FILE_SIZE};
pub use schema::SchemaRegistry;
pub use semantic::{Bundle, SemanticViolation, SpecSource};
