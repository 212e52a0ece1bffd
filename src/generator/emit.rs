//! Rendering and writing of planned artifacts under their write policy.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::policy::{ArtifactKind, WriteInstruction, WritePolicy};
use super::templates::Renderer;
use crate::error::GenerationError;

/// What happened to each artifact of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmissionReport {
    pub written: Vec<PathBuf>,
    /// Write-once targets that already existed
    pub skipped: Vec<PathBuf>,
    /// Path and reason for every artifact that could not be rendered or written
    pub failed: Vec<(PathBuf, String)>,
}

impl EmissionReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

enum Outcome {
    Written,
    Skipped,
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Create `path` only if nothing is there. The existence check and the create are one
/// `create_new` open.
fn write_once(path: &Path, contents: &str) -> io::Result<Outcome> {
    write_once_with(path, |file| file.write_all(contents.as_bytes()))
}

fn write_once_with(
    path: &Path,
    fill: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<Outcome> {
    ensure_parent(path)?;
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            if let Err(e) = fill(&mut file) {
                drop(file);
                // a truncated file would be skipped as existing on every later run
                if let Err(cleanup) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %cleanup, "could not remove partial file");
                }
                return Err(e);
            }
            Ok(Outcome::Written)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(Outcome::Skipped),
        Err(e) => Err(e),
    }
}

fn write_always(path: &Path, contents: &str) -> io::Result<Outcome> {
    ensure_parent(path)?;
    fs::write(path, contents)?;
    Ok(Outcome::Written)
}

fn emit_one(
    instruction: &WriteInstruction,
    renderer: &dyn Renderer,
    dry_run: bool,
) -> anyhow::Result<Outcome> {
    let text = renderer.render(instruction)?;
    let path = &instruction.output_path;
    if dry_run {
        let exists = path.exists();
        return Ok(match instruction.write_policy {
            WritePolicy::WriteOnce if exists => Outcome::Skipped,
            _ => Outcome::Written,
        });
    }
    let outcome = match instruction.write_policy {
        WritePolicy::Always => write_always(path, &text)?,
        WritePolicy::WriteOnce => write_once(path, &text)?,
    };
    Ok(outcome)
}

/// Render and write every instruction in order.
///
/// With `dry_run` nothing touches the disk; the report says what would happen.
///
/// # Errors
///
/// Returns [`GenerationError::MissingTemplate`] before writing anything if the renderer
/// cannot produce one of the planned kinds. Failures of single artifacts are logged,
/// recorded in the report, and do not stop the run.
pub fn emit(
    instructions: &[WriteInstruction],
    renderer: &dyn Renderer,
    dry_run: bool,
) -> Result<EmissionReport, GenerationError> {
    for kind in ArtifactKind::ALL {
        if instructions.iter().any(|i| i.kind == kind) && !renderer.supports(kind) {
            return Err(GenerationError::MissingTemplate { kind });
        }
    }

    let mut report = EmissionReport::default();
    for instruction in instructions {
        let path = instruction.output_path.clone();
        match emit_one(instruction, renderer, dry_run) {
            Ok(Outcome::Written) => {
                debug!(kind = %instruction.kind, path = %path.display(), dry_run, "wrote artifact");
                report.written.push(path);
            }
            Ok(Outcome::Skipped) => {
                info!(
                    kind = %instruction.kind,
                    path = %path.display(),
                    "skipping existing {} file",
                    instruction.kind
                );
                report.skipped.push(path);
            }
            Err(e) => {
                let reason = format!("{e:#}");
                error!(
                    kind = %instruction.kind,
                    name = %instruction.name,
                    path = %path.display(),
                    error = %reason,
                    "failed to emit artifact"
                );
                report.failed.push((path, reason));
            }
        }
    }
    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        dry_run,
        "emission finished"
    );
    Ok(report)
}
