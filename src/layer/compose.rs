//! Output composition
//!
//! Turns a layer request into merged lines, renders them with a
//! formatter, and places the result on disk. Build directories for image
//! tests use a content-addressed tag derived from a SHA256 of the
//! rendered Dockerfile.

use crate::error::{SliceError, SliceResult};
use crate::format::FormatKind;
use crate::layer::resolve::LayerRegistry;
use crate::slice::{parse_sections, scan_registry, ScanOptions, SliceRegistry};
use crate::version::VersionIdentifier;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Merged output of one layer request
#[derive(Debug)]
pub struct Resolution {
    /// Label of the first requested layer as resolved
    pub label: String,

    /// Section-tagged lines, dependencies first
    pub lines: Vec<String>,

    /// Identifiers no slice could satisfy, first failure first
    pub missing: Vec<VersionIdentifier>,
}

impl Resolution {
    /// Fail with every missing identifier at once
    pub fn ensure_complete(&self) -> SliceResult<()> {
        if self.missing.is_empty() {
            return Ok(());
        }
        Err(SliceError::MissingSlices(
            self.missing.iter().map(|m| m.label().to_string()).collect(),
        ))
    }

    /// Render the merged lines with the given format
    pub fn render(&self, format: FormatKind) -> String {
        render(&self.lines, format)
    }
}

/// Scan `root` and resolve `requested` layers on `os`
pub fn resolve(
    root: &Path,
    requested: &[String],
    os: &str,
    major: u32,
) -> SliceResult<Resolution> {
    let options = ScanOptions::new(major, os)?;
    let slices = scan_registry(root, &options)?;

    let requested = requested
        .iter()
        .map(|name| parse_layer_name(name))
        .collect::<SliceResult<Vec<_>>>()?;

    resolve_registry(slices, &requested, options.os)
}

/// Resolve against an already scanned registry
pub fn resolve_registry(
    slices: SliceRegistry,
    requested: &[VersionIdentifier],
    os: VersionIdentifier,
) -> SliceResult<Resolution> {
    let mut layers = LayerRegistry::new(slices, requested, os)?;
    let lines = layers.merge();

    let resolution = Resolution {
        label: layers.layer(0).identifier().label().to_string(),
        missing: layers.missing_identifiers().to_vec(),
        lines,
    };
    debug!(
        "Merged {} line(s) for {}",
        resolution.lines.len(),
        resolution.label
    );
    Ok(resolution)
}

/// Split a comma-separated layer list (`jekyll,ruby-2`)
pub fn parse_layer_list(input: &str) -> SliceResult<Vec<String>> {
    let names: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(SliceError::NoLayersRequested);
    }
    for name in &names {
        validate_layer_name(name)?;
    }
    Ok(names)
}

fn parse_layer_name(name: &str) -> SliceResult<VersionIdentifier> {
    validate_layer_name(name)?;
    VersionIdentifier::parse(name)
}

/// Layer names end up in output paths; keep them to plain labels.
fn validate_layer_name(name: &str) -> SliceResult<()> {
    if name.is_empty() {
        return Err(SliceError::User("Layer name cannot be empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") || name.contains('\0') {
        return Err(SliceError::User(format!(
            "Invalid layer name '{}': must not contain path separators or '..'",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(SliceError::User(format!(
            "Invalid layer name '{}': use letters, digits, '-', '_' or '.'",
            name
        )));
    }
    Ok(())
}

/// Group merged lines back into sections and render them
pub fn render<S: AsRef<str>>(lines: &[S], format: FormatKind) -> String {
    format.formatter().write(&parse_sections(lines))
}

/// Default output location: `<dir>/<label>/<label>.sh` or
/// `<dir>/<label>/Dockerfile`
pub fn output_path(dir: &Path, label: &str, format: FormatKind) -> PathBuf {
    dir.join(label).join(format.file_name(label))
}

/// Deterministic image tag for a rendered Dockerfile
pub fn compute_image_tag(prefix: &str, dockerfile: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dockerfile.as_bytes());

    let hash = hex::encode(hasher.finalize());
    format!("{}-{}", prefix, &hash[..12])
}

/// Write `dockerfile` into a fresh build directory named after `tag`.
///
/// Lives under `~/.local/share/slicebuild/builds/` so the container
/// runtime can read it regardless of the working directory.
pub async fn prepare_build_dir(tag: &str, dockerfile: &str) -> SliceResult<PathBuf> {
    let build_dir = state_dir()?.join("builds").join(tag);
    if build_dir.exists() {
        tokio::fs::remove_dir_all(&build_dir)
            .await
            .map_err(|e| SliceError::io("clearing build directory", e))?;
    }
    tokio::fs::create_dir_all(&build_dir)
        .await
        .map_err(|e| SliceError::io("creating build directory", e))?;

    tokio::fs::write(build_dir.join("Dockerfile"), dockerfile)
        .await
        .map_err(|e| SliceError::io("writing Dockerfile", e))?;

    Ok(build_dir)
}

/// The slicebuild state directory (`~/.local/share/slicebuild/`)
pub fn state_dir() -> SliceResult<PathBuf> {
    let dir = dirs::data_local_dir()
        .ok_or_else(|| SliceError::Internal("Could not determine data directory".to_string()))?
        .join("slicebuild");
    Ok(dir)
}
