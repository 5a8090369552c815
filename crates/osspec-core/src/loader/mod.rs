//! Spec-tree loader.
//!
//! Walks `<repo>/<specs_dir>` and returns the raw bytes of every spec file in
//! a stable order. The walk enforces the repository safety policy: no
//! symlinks anywhere in the subtree, regular `.json` files only, a hard
//! per-file size cap, and no paths resolving outside the repo root.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// Hard cap on a single spec file.
pub const MAX_SPEC_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Cooperative cancellation flag threaded through the loader, so a long walk
/// over a large specs tree can be aborted. Clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One loaded spec file. `rel_path` is repo-relative with forward-slash
/// separators regardless of host OS.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub abs_path: PathBuf,
    pub rel_path: String,
    pub bytes: Vec<u8>,
}

/// Loader errors.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("symlink not allowed: {rel_path}")]
    Symlink { rel_path: String },

    #[error("file too large (>2MiB): {rel_path}")]
    TooLarge { rel_path: String },

    #[error("path escapes repo root: {path}")]
    EscapesRoot { path: PathBuf },

    #[error("load cancelled")]
    Cancelled,

    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("walking specs tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Walk the specs subtree and return its files sorted by `rel_path`.
///
/// On cancellation the walk stops and propagates [`LoaderError::Cancelled`]
/// without returning partial results.
pub fn load_spec_files(
    repo_root: &Path,
    specs_dir: &str,
    cancel: &CancelToken,
) -> Result<Vec<LoadedFile>, LoaderError> {
    let specs_abs = repo_root.join(specs_dir);

    let mut out = Vec::new();
    for entry in WalkDir::new(&specs_abs).follow_links(false) {
        if cancel.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }
        let entry = entry?;

        if entry.path_is_symlink() {
            return Err(LoaderError::Symlink {
                rel_path: rel_path_of(repo_root, entry.path())?,
            });
        }
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata()?;
        if metadata.len() > MAX_SPEC_FILE_SIZE {
            return Err(LoaderError::TooLarge {
                rel_path: rel_path_of(repo_root, entry.path())?,
            });
        }

        let bytes = std::fs::read(entry.path()).map_err(|source| LoaderError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;
        out.push(LoadedFile {
            abs_path: entry.path().to_path_buf(),
            rel_path: rel_path_of(repo_root, entry.path())?,
            bytes,
        });
    }

    // Stable ordering for determinism downstream.
    out.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    debug!(count = out.len(), "loaded spec files");
    Ok(out)
}

fn rel_path_of(repo_root: &Path, path: &Path) -> Result<String, LoaderError> {
    let rel = path
        .strip_prefix(repo_root)
        .map_err(|_| LoaderError::EscapesRoot {
            path: path.to_path_buf(),
        })?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn returns_json_files_sorted_by_rel_path() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "specs/b/later.json", b"{}");
        write(tmp.path(), "specs/a/first.json", b"{}");
        write(tmp.path(), "specs/a/notes.md", b"skip me");

        let files = load_spec_files(tmp.path(), "specs", &CancelToken::new()).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(rels, vec!["specs/a/first.json", "specs/b/later.json"]);
    }

    #[test]
    fn rejects_oversize_files() {
        let tmp = tempdir().unwrap();
        let big = vec![b' '; (MAX_SPEC_FILE_SIZE + 1) as usize];
        write(tmp.path(), "specs/huge.json", &big);

        let err = load_spec_files(tmp.path(), "specs", &CancelToken::new()).unwrap_err();
        assert!(matches!(err, LoaderError::TooLarge { .. }));
        assert!(err.to_string().contains("specs/huge.json"));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlinks_anywhere_in_tree() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "specs/real.json", b"{}");
        write(tmp.path(), "outside.json", b"{}");
        std::os::unix::fs::symlink(tmp.path().join("outside.json"), tmp.path().join("specs/link.json"))
            .unwrap();

        let err = load_spec_files(tmp.path(), "specs", &CancelToken::new()).unwrap_err();
        assert!(matches!(err, LoaderError::Symlink { .. }));
    }

    #[test]
    fn cancellation_stops_the_walk() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "specs/one.json", b"{}");

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = load_spec_files(tmp.path(), "specs", &cancel).unwrap_err();
        assert!(matches!(err, LoaderError::Cancelled));
    }

    #[test]
    fn missing_specs_dir_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = load_spec_files(tmp.path(), "specs", &CancelToken::new()).unwrap_err();
        assert!(matches!(err, LoaderError::Walk(_)));
    }
}
