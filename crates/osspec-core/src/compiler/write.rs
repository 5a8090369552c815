//! Dist writer: canonical-JSON files for the compiled tree.
//!
//! Every emitted file is the JCS encoding of its value plus a trailing
//! newline, so on-disk bytes hash back to the recorded content address.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{compile, CompileOptions, CompileResult};
use crate::canonicalize::hash_object;
use crate::error::CompileError;
use crate::loader::CancelToken;

pub struct BuildOptions {
    pub compile: CompileOptions,
    pub dist_dir: String,
}

impl BuildOptions {
    pub fn new(repo_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            compile: CompileOptions::new(repo_root),
            dist_dir: "dist".to_string(),
        }
    }
}

/// Compile and write the dist tree. Nothing is written when compile fails.
pub fn build(opts: &BuildOptions, cancel: &CancelToken) -> Result<CompileResult, CompileError> {
    let result = compile(&opts.compile, cancel)?;
    write_dist(opts, &result)?;
    info!(dist = %opts.dist_dir, "dist tree written");
    Ok(result)
}

fn write_dist(opts: &BuildOptions, result: &CompileResult) -> Result<(), CompileError> {
    let repo_root = opts.compile.repo_root.as_path();
    let dist = repo_root.join(&opts.dist_dir);
    let docs = repo_root.join("docs");

    create_dir_all(&dist.join("index"))?;
    // Stale compiled output would otherwise survive key renames.
    let compiled = dist.join("compiled");
    if compiled.exists() {
        fs::remove_dir_all(&compiled).map_err(|source| CompileError::Io {
            path: compiled.clone(),
            source,
        })?;
    }
    for sub in ["rulesets", "datasets", "connectors", "profiles"] {
        create_dir_all(&compiled.join(sub))?;
    }

    write_canonical_json(&dist.join("descriptor.v1.json"), &result.descriptor)?;

    // Published mirror for the docs site.
    create_dir_all(&docs)?;
    write_canonical_json(&docs.join("descriptor.v1.json"), &result.descriptor)?;
    copy_metaschema(&repo_root.join(&opts.compile.metaschema_dir), &docs.join("metaschema"))?;

    write_canonical_json(&dist.join("index").join("artifacts.json"), &result.artifacts)?;
    write_canonical_json(
        &dist.join("index").join("requirements.json"),
        &result.requirements,
    )?;
    write_canonical_json(
        &dist.join("index").join("dictionary.compiled.json"),
        &result.descriptor.dictionary.object,
    )?;

    for rs in &result.descriptor.rulesets {
        let name = format!("{}.json", sanitize_filename(&rs.object.ruleset.key));
        write_canonical_json(&compiled.join("rulesets").join(name), &rs.object)?;
    }
    for dc in &result.descriptor.dataset_contracts {
        let name = format!(
            "{}.v{}.json",
            sanitize_filename(&dc.object.dataset.key),
            dc.object.dataset.version
        );
        write_canonical_json(&compiled.join("datasets").join(name), &dc.object)?;
    }
    for c in &result.descriptor.connectors {
        let name = format!("{}.json", sanitize_filename(&c.object.connector.kind));
        write_canonical_json(&compiled.join("connectors").join(name), &c.object)?;
    }
    for p in &result.descriptor.profiles {
        let name = format!("{}.json", sanitize_filename(&p.object.profile.key));
        write_canonical_json(&compiled.join("profiles").join(name), &p.object)?;
    }
    write_canonical_json(
        &compiled.join("dictionary.json"),
        &result.descriptor.dictionary.object,
    )?;

    Ok(())
}

fn copy_metaschema(src_dir: &Path, dst_dir: &Path) -> Result<(), CompileError> {
    if dst_dir.exists() {
        fs::remove_dir_all(dst_dir).map_err(|source| CompileError::Io {
            path: dst_dir.to_path_buf(),
            source,
        })?;
    }
    create_dir_all(dst_dir)?;

    let entries = fs::read_dir(src_dir).map_err(|source| CompileError::Io {
        path: src_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| CompileError::Io {
            path: src_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let dst = dst_dir.join(entry.file_name());
        fs::copy(&path, &dst).map_err(|source| CompileError::Io { path: dst, source })?;
    }
    Ok(())
}

fn create_dir_all(path: &Path) -> Result<(), CompileError> {
    fs::create_dir_all(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_canonical_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<(), CompileError> {
    let (_, mut canonical) = hash_object(value).map_err(|source| CompileError::Hash {
        path: path.display().to_string(),
        source,
    })?;
    canonical.push(b'\n');
    fs::write(path, canonical).map_err(|source| CompileError::Io {
        path: path.clone(),
        source,
    })
}

/// Keep `[A-Za-z0-9._-]`; anything else becomes `_`.
pub fn sanitize_filename(s: &str) -> String {
    if s.is_empty() {
        return "unnamed".to_string();
    }
    s.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
