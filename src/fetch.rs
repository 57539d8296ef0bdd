//! Slice registry download
//!
//! The slice repository publishes one branch per registry release, named
//! by version. The newest branch whose major version matches the
//! compatibility gate is downloaded as a `.tar.gz`, unpacked into a
//! staging directory and moved into the registry root.
//!
//! Everything here blocks; callers on the async runtime use
//! `spawn_blocking`.

use crate::error::{SliceError, SliceResult};
use crate::version::{SemVer, VersionIdentifier};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("slicebuild/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a downloaded archive
const MAX_ARCHIVE_BYTES: u64 = 64 * 1024 * 1024;

/// Branch that never holds a release
const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Deserialize)]
struct BranchEntry {
    name: String,
}

/// Branch names from a GitHub `branches` API response
pub fn parse_branches(json: &str) -> SliceResult<Vec<String>> {
    let entries: Vec<BranchEntry> = serde_json::from_str(json)?;
    Ok(entries.into_iter().map(|e| e.name).collect())
}

/// Version encoded in a branch name (`1.2`, `v1.2` or `slices-1.2`)
fn branch_version(branch: &str) -> Option<SemVer> {
    if branch == DEFAULT_BRANCH || !branch.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let bare = branch.strip_prefix('v').unwrap_or(branch);
    let label = if bare.starts_with(|c: char| c.is_ascii_digit()) {
        format!("branch-{}", bare)
    } else {
        branch.to_string()
    };
    VersionIdentifier::parse(&label).ok().map(|id| id.version())
}

/// Newest branch whose major version equals `major`
pub fn select_branch(branches: &[String], major: u32) -> SliceResult<String> {
    branches
        .iter()
        .filter_map(|name| branch_version(name).map(|version| (version, name)))
        .filter(|(version, _)| version.major == major)
        .max()
        .map(|(_, name)| name.clone())
        .ok_or(SliceError::NoReleaseBranch(major))
}

/// Expand `{branch}` in an archive URL template
pub fn archive_url(template: &str, branch: &str) -> String {
    template.replace("{branch}", branch)
}

fn fetch_error(url: &str, reason: impl fmt::Display) -> SliceError {
    SliceError::Fetch {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// List the branches of the slice repository
pub fn list_branches(url: &str) -> SliceResult<Vec<String>> {
    debug!("Listing branches from {}", url);
    let mut response = ureq::get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .call()
        .map_err(|e| fetch_error(url, e))?;

    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| fetch_error(url, e))?;
    parse_branches(&body)
}

/// Download an archive into memory
pub fn download(url: &str) -> SliceResult<Vec<u8>> {
    info!("Downloading {}", url);
    let mut response = ureq::get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| fetch_error(url, e))?;

    let data = response
        .body_mut()
        .with_config()
        .limit(MAX_ARCHIVE_BYTES)
        .read_to_vec()
        .map_err(|e| fetch_error(url, e))?;
    debug!("Downloaded {} bytes", data.len());
    Ok(data)
}

/// Unpack a `.tar.gz` into `staging` and return its single top-level
/// directory
pub fn unpack(data: &[u8], staging: &Path) -> SliceResult<PathBuf> {
    let mut archive = Archive::new(GzDecoder::new(data));
    archive
        .unpack(staging)
        .map_err(|e| SliceError::ArchiveInvalid(e.to_string()))?;

    let entries = fs::read_dir(staging)
        .map_err(|e| SliceError::io(format!("reading {}", staging.display()), e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| SliceError::io(format!("reading {}", staging.display()), e))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.as_slice() {
        [top] => Ok(top.clone()),
        [] => Err(SliceError::ArchiveInvalid(
            "no top-level directory".to_string(),
        )),
        _ => Err(SliceError::ArchiveInvalid(format!(
            "expected one top-level directory, found {}",
            dirs.len()
        ))),
    }
}

/// Where an unpacked directory lands in the registry root
pub fn install_target(unpacked: &Path, root: &Path) -> SliceResult<PathBuf> {
    let name = unpacked
        .file_name()
        .ok_or_else(|| SliceError::ArchiveInvalid("unnamed top-level directory".to_string()))?;
    Ok(root.join(name))
}

/// Move an unpacked directory into the registry root, replacing an
/// existing directory of the same name.
///
/// The existing directory is moved aside first and only removed once the
/// new one is in place; a failed move restores it.
pub fn install(unpacked: &Path, root: &Path) -> SliceResult<PathBuf> {
    let target = install_target(unpacked, root)?;

    fs::create_dir_all(root)
        .map_err(|e| SliceError::io(format!("creating {}", root.display()), e))?;

    let replaced = if target.exists() {
        let aside = aside_path(&target);
        if aside.exists() {
            fs::remove_dir_all(&aside)
                .map_err(|e| SliceError::io(format!("removing {}", aside.display()), e))?;
        }
        debug!("Moving {} aside", target.display());
        fs::rename(&target, &aside)
            .map_err(|e| SliceError::io(format!("moving {} aside", target.display()), e))?;
        Some(aside)
    } else {
        None
    };

    if let Err(e) = fs::rename(unpacked, &target) {
        if let Some(aside) = &replaced {
            if let Err(restore) = fs::rename(aside, &target) {
                warn!("Could not restore {}: {}", target.display(), restore);
            }
        }
        return Err(SliceError::io(
            format!("moving {} to {}", unpacked.display(), target.display()),
            e,
        ));
    }

    if let Some(aside) = replaced {
        fs::remove_dir_all(&aside)
            .map_err(|e| SliceError::io(format!("removing {}", aside.display()), e))?;
    }

    info!("Installed {}", target.display());
    Ok(target)
}

/// Hidden sibling holding a directory being replaced
fn aside_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".replaced-{}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_github_branch_listing() {
        let json = r#"[
            {"name": "1.0", "commit": {"sha": "abc"}, "protected": false},
            {"name": "master", "commit": {"sha": "def"}, "protected": true}
        ]"#;
        assert_eq!(parse_branches(json).unwrap(), ["1.0", "master"]);
        assert!(parse_branches("{\"message\": \"rate limited\"}").is_err());
    }

    #[test]
    fn selects_newest_compatible_branch() {
        let branches = names(&[
            "master",
            "0.9",
            "1.0",
            "1.2",
            "1.10",
            "2.0",
            "1.3-beta.1",
            "docs",
        ]);
        assert_eq!(select_branch(&branches, 1).unwrap(), "1.10");
        assert_eq!(select_branch(&branches, 2).unwrap(), "2.0");
        assert_eq!(select_branch(&branches, 0).unwrap(), "0.9");
    }

    #[test]
    fn release_beats_prerelease() {
        let branches = names(&["1.3-rc.1", "1.3", "1.3-beta.2"]);
        assert_eq!(select_branch(&branches, 1).unwrap(), "1.3");
    }

    #[test]
    fn prefixed_branch_names() {
        let branches = names(&["v1.1", "slices-1.4", "v2.0"]);
        assert_eq!(select_branch(&branches, 1).unwrap(), "slices-1.4");
    }

    #[test]
    fn no_compatible_branch() {
        let err = select_branch(&names(&["master", "2.0"]), 1).unwrap_err();
        assert!(matches!(err, SliceError::NoReleaseBranch(1)));
    }

    #[test]
    fn expands_archive_url() {
        assert_eq!(
            archive_url("https://example.com/archive/{branch}.tar.gz", "1.2"),
            "https://example.com/archive/1.2.tar.gz"
        );
    }

    #[test]
    fn unpacks_and_installs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("slices");
        let staging = temp.path().join("staging");
        fs::create_dir_all(&staging).unwrap();

        // stale content is replaced, not merged
        fs::create_dir_all(root.join("slices-1.0/old")).unwrap();
        fs::write(root.join("slices-1.0/old/stale-1"), "RUN\necho stale").unwrap();

        let data = tar_gz(&[
            ("slices-1.0/os/debian-8", "OS\ndebian-8"),
            ("slices-1.0/README.md", "docs"),
        ]);
        let top = unpack(&data, &staging).unwrap();
        assert_eq!(top.file_name().unwrap(), "slices-1.0");

        let installed = install(&top, &root).unwrap();
        assert_eq!(installed, root.join("slices-1.0"));
        assert!(installed.join("os/debian-8").is_file());
        assert!(!installed.join("old").exists());
        assert!(!top.exists());
        assert!(!root.join(".replaced-slices-1.0").exists());
    }

    #[test]
    fn failed_install_keeps_existing_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("slices");
        fs::create_dir_all(root.join("slices-1.0/os")).unwrap();
        fs::write(root.join("slices-1.0/os/debian-8"), "OS\ndebian-8").unwrap();

        // nothing to move in: the rename fails after the old tree moved aside
        let gone = temp.path().join("staging").join("slices-1.0");
        assert!(install(&gone, &root).is_err());

        assert!(root.join("slices-1.0/os/debian-8").is_file());
        assert!(!root.join(".replaced-slices-1.0").exists());
    }

    #[test]
    fn archive_needs_one_top_level_directory() {
        let temp = TempDir::new().unwrap();
        let data = tar_gz(&[("a/x", "1"), ("b/y", "2")]);
        let err = unpack(&data, temp.path()).unwrap_err();
        assert!(matches!(err, SliceError::ArchiveInvalid(_)));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let temp = TempDir::new().unwrap();
        let err = unpack(b"not a tarball", temp.path()).unwrap_err();
        assert!(matches!(err, SliceError::ArchiveInvalid(_)));
    }
}
