//! Compile orchestration.
//!
//! One linear pass: load repo config → load specs → schema-validate →
//! typed parse → normalize → semantic validate → index and hash → assemble
//! the descriptor. Any stage failure aborts the run; no output is produced.

mod write;

pub use write::{build, sanitize_filename, BuildOptions};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::canonicalize::hash_object;
use crate::error::CompileError;
use crate::index::build_requirements;
use crate::loader::{load_spec_files, CancelToken};
use crate::normalize;
use crate::schema::SchemaRegistry;
use crate::semantic::{self, Bundle, SpecSource};
use crate::spec::{
    Artifact, ArtifactsIndex, Compiled, ConnectorManifestDoc, DatasetContractDoc, Descriptor,
    DescriptorIndex, DictionaryDoc, Header, ProfileDoc, RequirementsIndex, RulesetDoc,
    VersionRecord, KIND_ARTIFACTS_INDEX, KIND_CONNECTOR_MANIFEST, KIND_DATASET_CONTRACT,
    KIND_DESCRIPTOR, KIND_DICTIONARY, KIND_PROFILE, KIND_RULESET, KIND_VERSION, SCHEMA_VERSION,
};

pub struct CompileOptions {
    pub repo_root: PathBuf,
    pub specs_dir: String,
    pub metaschema_dir: String,
}

impl CompileOptions {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            specs_dir: "specs".to_string(),
            metaschema_dir: "metaschema".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct CompileResult {
    pub descriptor: Descriptor,
    pub artifacts: ArtifactsIndex,
    pub requirements: RequirementsIndex,
}

/// Compile the repository at `opts.repo_root`.
pub fn compile(opts: &CompileOptions, cancel: &CancelToken) -> Result<CompileResult, CompileError> {
    let repo_root = opts.repo_root.as_path();

    let registry = SchemaRegistry::load(&repo_root.join(&opts.metaschema_dir))?;

    let (version, version_hash) = load_version(repo_root)?;
    let (dictionary, dictionary_hash) = load_dictionary(repo_root, &registry)?;

    let files = load_spec_files(repo_root, &opts.specs_dir, cancel)?;

    let mut bundle = Bundle {
        version: version.clone(),
        dictionary: Some(SpecSource::new("dictionary.json", dictionary.clone())),
        ..Bundle::default()
    };

    for file in &files {
        let header: Header =
            serde_json::from_slice(&file.bytes).map_err(|source| CompileError::Parse {
                path: file.rel_path.clone(),
                kind: "header".to_string(),
                source,
            })?;
        if header.schema_version != SCHEMA_VERSION {
            return Err(CompileError::Header {
                path: file.rel_path.clone(),
                message: format!("unsupported schema_version {}", header.schema_version),
            });
        }
        registry
            .validate_kind(&header.kind, &file.bytes)
            .map_err(|source| CompileError::Schema {
                path: file.rel_path.clone(),
                source,
            })?;

        match header.kind.as_str() {
            KIND_RULESET => {
                let mut doc: RulesetDoc = parse_doc(file, "ruleset")?;
                normalize::ruleset_doc(&mut doc);
                bundle.rulesets.push(SpecSource::new(file.rel_path.as_str(), doc));
            }
            KIND_DATASET_CONTRACT => {
                let doc: DatasetContractDoc = parse_doc(file, "dataset_contract")?;
                bundle
                    .dataset_contracts
                    .push(SpecSource::new(file.rel_path.as_str(), doc));
            }
            KIND_CONNECTOR_MANIFEST => {
                let mut doc: ConnectorManifestDoc = parse_doc(file, "connector_manifest")?;
                normalize::connector_manifest_doc(&mut doc);
                bundle.connectors.push(SpecSource::new(file.rel_path.as_str(), doc));
            }
            KIND_PROFILE => {
                let mut doc: ProfileDoc = parse_doc(file, "profile")?;
                normalize::profile_doc(&mut doc);
                bundle.profiles.push(SpecSource::new(file.rel_path.as_str(), doc));
            }
            other => {
                return Err(CompileError::Header {
                    path: file.rel_path.clone(),
                    message: format!("unknown kind {other:?}"),
                })
            }
        }
    }
    debug!(
        rulesets = bundle.rulesets.len(),
        dataset_contracts = bundle.dataset_contracts.len(),
        connectors = bundle.connectors.len(),
        profiles = bundle.profiles.len(),
        "bundle parsed"
    );

    let violations = semantic::validate(&bundle);
    if !violations.is_empty() {
        return Err(CompileError::Validation(violations));
    }

    let requirements = build_requirements(&bundle);

    let mut artifacts = vec![
        Artifact {
            kind: KIND_VERSION.to_string(),
            key: "version".to_string(),
            source_path: "version.json".to_string(),
            hash: version_hash,
        },
        Artifact {
            kind: KIND_DICTIONARY.to_string(),
            key: "dictionary".to_string(),
            source_path: "dictionary.json".to_string(),
            hash: dictionary_hash.clone(),
        },
    ];

    let mut rulesets = Vec::with_capacity(bundle.rulesets.len());
    for rs in &bundle.rulesets {
        let hash = hash_doc(&rs.path, &rs.doc)?;
        artifacts.push(Artifact {
            kind: rs.doc.kind.clone(),
            key: rs.doc.ruleset.key.clone(),
            source_path: rs.path.clone(),
            hash: hash.clone(),
        });
        rulesets.push(Compiled {
            source_path: rs.path.clone(),
            hash,
            object: rs.doc.clone(),
        });
    }

    let mut dataset_contracts = Vec::with_capacity(bundle.dataset_contracts.len());
    for dc in &bundle.dataset_contracts {
        let hash = hash_doc(&dc.path, &dc.doc)?;
        artifacts.push(Artifact {
            kind: dc.doc.kind.clone(),
            key: format!("{}@{}", dc.doc.dataset.key, dc.doc.dataset.version),
            source_path: dc.path.clone(),
            hash: hash.clone(),
        });
        dataset_contracts.push(Compiled {
            source_path: dc.path.clone(),
            hash,
            object: dc.doc.clone(),
        });
    }

    let mut connectors = Vec::with_capacity(bundle.connectors.len());
    for c in &bundle.connectors {
        let hash = hash_doc(&c.path, &c.doc)?;
        artifacts.push(Artifact {
            kind: c.doc.kind.clone(),
            key: c.doc.connector.kind.clone(),
            source_path: c.path.clone(),
            hash: hash.clone(),
        });
        connectors.push(Compiled {
            source_path: c.path.clone(),
            hash,
            object: c.doc.clone(),
        });
    }

    let mut profiles = Vec::with_capacity(bundle.profiles.len());
    for p in &bundle.profiles {
        let hash = hash_doc(&p.path, &p.doc)?;
        artifacts.push(Artifact {
            kind: p.doc.kind.clone(),
            key: p.doc.profile.key.clone(),
            source_path: p.path.clone(),
            hash: hash.clone(),
        });
        profiles.push(Compiled {
            source_path: p.path.clone(),
            hash,
            object: p.doc.clone(),
        });
    }

    artifacts.sort_by(|a, b| (&a.kind, &a.key).cmp(&(&b.kind, &b.key)));
    let artifacts = ArtifactsIndex {
        schema_version: SCHEMA_VERSION,
        kind: KIND_ARTIFACTS_INDEX.to_string(),
        artifacts,
    };

    let descriptor = Descriptor {
        schema_version: SCHEMA_VERSION,
        kind: KIND_DESCRIPTOR.to_string(),
        version,
        dictionary: Compiled {
            source_path: "dictionary.json".to_string(),
            hash: dictionary_hash,
            object: dictionary,
        },
        rulesets,
        dataset_contracts,
        connectors,
        profiles,
        index: DescriptorIndex {
            requirements: requirements.clone(),
            artifacts: artifacts.clone(),
        },
    };

    Ok(CompileResult {
        descriptor,
        artifacts,
        requirements,
    })
}

fn load_version(repo_root: &Path) -> Result<(VersionRecord, String), CompileError> {
    let path = repo_root.join("version.json");
    let bytes = fs::read(&path).map_err(|source| CompileError::Io {
        path: path.clone(),
        source,
    })?;
    let version: VersionRecord =
        serde_json::from_slice(&bytes).map_err(|source| CompileError::Parse {
            path: "version.json".to_string(),
            kind: "version".to_string(),
            source,
        })?;
    if version.project.is_empty()
        || version.repo.is_empty()
        || version.spec_version.is_empty()
        || version.schema_version != SCHEMA_VERSION
    {
        return Err(CompileError::InvalidVersion);
    }
    let (hash, _) = hash_object(&version).map_err(|source| CompileError::Hash {
        path: "version.json".to_string(),
        source,
    })?;
    Ok((version, hash))
}

fn load_dictionary(
    repo_root: &Path,
    registry: &SchemaRegistry,
) -> Result<(DictionaryDoc, String), CompileError> {
    let path = repo_root.join("dictionary.json");
    let bytes = fs::read(&path).map_err(|source| CompileError::Io {
        path: path.clone(),
        source,
    })?;
    registry
        .validate_kind(KIND_DICTIONARY, &bytes)
        .map_err(|source| CompileError::Schema {
            path: "dictionary.json".to_string(),
            source,
        })?;
    let mut doc: DictionaryDoc =
        serde_json::from_slice(&bytes).map_err(|source| CompileError::Parse {
            path: "dictionary.json".to_string(),
            kind: "dictionary".to_string(),
            source,
        })?;
    normalize::dictionary_doc(&mut doc);
    let (hash, _) = hash_object(&doc).map_err(|source| CompileError::Hash {
        path: "dictionary.json".to_string(),
        source,
    })?;
    Ok((doc, hash))
}

fn parse_doc<T: serde::de::DeserializeOwned>(
    file: &crate::loader::LoadedFile,
    kind: &str,
) -> Result<T, CompileError> {
    serde_json::from_slice(&file.bytes).map_err(|source| CompileError::Parse {
        path: file.rel_path.clone(),
        kind: kind.to_string(),
        source,
    })
}

fn hash_doc<T: serde::Serialize>(path: &str, doc: &T) -> Result<String, CompileError> {
    let (hash, _) = hash_object(doc).map_err(|source| CompileError::Hash {
        path: path.to_string(),
        source,
    })?;
    Ok(hash)
}
