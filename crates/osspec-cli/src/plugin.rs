//! Codegen plugin runner: one-shot JSON over stdio.
//!
//! The plugin is discovered as `osspec-gen-<lang>` on PATH; during
//! development it falls back to `cargo run -q -p osspec-gen-<lang>` from the
//! repo root. The child reads one `CodegenRequest` on stdin and must answer
//! with one `CodegenResponse` on stdout.

use anyhow::{bail, Context, Result};
use osspec_core::spec::{
    CodegenFile, CodegenRequest, CodegenResponse, KIND_CODEGEN_RESPONSE, SCHEMA_VERSION,
};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::debug;

pub struct PluginRunner {
    pub repo_root: PathBuf,
}

impl PluginRunner {
    pub fn run(&self, language: &str, request: &CodegenRequest) -> Result<CodegenResponse> {
        let plugin_name = format!("osspec-gen-{language}");
        let input = serde_json::to_vec(request).context("serializing codegen request")?;

        let mut child = self.spawn(&plugin_name)?;
        // Feed stdin from a separate thread so a chatty plugin cannot
        // deadlock against a full stdout pipe.
        let mut stdin = child.stdin.take().expect("stdin piped");
        let writer = std::thread::spawn(move || stdin.write_all(&input));
        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for {plugin_name}"))?;
        // A plugin that exits without draining stdin surfaces as a status or
        // parse failure below; a broken pipe here is not itself fatal.
        let _ = writer.join();

        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if message.is_empty() {
                message = output.status.to_string();
            }
            bail!("plugin {plugin_name} failed: {message}");
        }

        let response: CodegenResponse = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("parsing {plugin_name} response"))?;
        if response.schema_version != SCHEMA_VERSION || response.kind != KIND_CODEGEN_RESPONSE {
            bail!(
                "plugin {plugin_name} returned invalid response header: schema_version={} kind={:?}",
                response.schema_version,
                response.kind
            );
        }
        Ok(response)
    }

    fn spawn(&self, plugin_name: &str) -> Result<Child> {
        match Command::new(plugin_name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => {
                debug!(plugin = plugin_name, "running plugin from PATH");
                Ok(child)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Dev fallback: run the plugin from repo source.
                debug!(plugin = plugin_name, "plugin not on PATH, trying cargo run");
                Command::new("cargo")
                    .args(["run", "-q", "-p", plugin_name])
                    .current_dir(&self.repo_root)
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .with_context(|| {
                        format!("plugin {plugin_name} not found in PATH and cargo fallback failed")
                    })
            }
            Err(e) => Err(e).with_context(|| format!("spawning {plugin_name}")),
        }
    }
}

/// Write generated files under `out_dir` with a guaranteed trailing newline.
/// Paths must be relative and must not escape the output directory.
pub fn write_generated_files(out_dir: &Path, files: &[CodegenFile]) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))?;
    for file in files {
        let rel = checked_relative_path(&file.path)?;
        let target = out_dir.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut content = file.content.clone();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        std::fs::write(&target, content)
            .with_context(|| format!("writing {}", target.display()))?;
    }
    Ok(())
}

fn checked_relative_path(raw: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    if raw.is_empty() || path.is_absolute() {
        bail!("codegen: invalid file path {raw:?}");
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            _ => bail!("codegen: path escapes output dir: {raw:?}"),
        }
    }
    Ok(path.to_path_buf())
}
