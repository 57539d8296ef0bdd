//! Registry directory scanning
//!
//! Layout: `root/<bunch>-<version>/**/<slice-file>`. Only bunches whose
//! major version equals the configured major are read; this keeps a tool
//! release from reading slices written for an incompatible one.

use crate::error::{SliceError, SliceResult};
use crate::slice::{Slice, SliceRegistry};
use crate::version::{SemVer, VersionIdentifier};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions of documentation files that live next to slices
const DOC_EXTENSIONS: [&str; 2] = ["md", "txt"];

/// What to read from a registry root
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Bunch major version to accept
    pub major: u32,

    /// Target OS; slices are kept only if their `OS` section lists it.
    /// An empty name keeps every slice.
    pub os: VersionIdentifier,
}

impl ScanOptions {
    pub fn new(major: u32, os: &str) -> SliceResult<Self> {
        Ok(Self {
            major,
            os: VersionIdentifier::parse(os)?,
        })
    }

    fn accepts(&self, slice: &Slice) -> bool {
        self.os.name().is_empty() || slice.supports_os(&self.os)
    }
}

/// Scan `root` into a sorted registry.
///
/// Malformed labels and duplicate identifiers abort the scan.
pub fn scan_registry(root: &Path, options: &ScanOptions) -> SliceResult<SliceRegistry> {
    if !root.is_dir() {
        return Err(SliceError::RegistryNotFound(root.to_path_buf()));
    }

    let mut registry = SliceRegistry::new();
    let mut bunches = 0;

    for (bunch_dir, bunch) in bunch_dirs(root)? {
        if bunch.major() != options.major {
            debug!(
                "Skipping bunch {} (major {} != {})",
                bunch,
                bunch.major(),
                options.major
            );
            continue;
        }

        bunches += 1;
        scan_bunch(root, &bunch_dir, bunch.version(), options, &mut registry)?;
    }

    if bunches == 0 {
        warn!(
            "No slice bunch with major version {} under {}",
            options.major,
            root.display()
        );
    }

    registry.sort();
    info!(
        "Scanned {} slice(s) for '{}' from {} bunch(es)",
        registry.len(),
        options.os,
        bunches
    );
    Ok(registry)
}

/// Immediate child directories of the root with their parsed names
fn bunch_dirs(root: &Path) -> SliceResult<Vec<(PathBuf, VersionIdentifier)>> {
    let entries = fs::read_dir(root)
        .map_err(|e| SliceError::io(format!("reading registry {}", root.display()), e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| SliceError::io(format!("reading registry {}", root.display()), e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) {
            continue;
        }
        dirs.push((path, VersionIdentifier::parse(&name)?));
    }

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

fn scan_bunch(
    root: &Path,
    bunch_dir: &Path,
    bunch: SemVer,
    options: &ScanOptions,
    registry: &mut SliceRegistry,
) -> SliceResult<()> {
    debug!("Scanning bunch {}", bunch_dir.display());

    let walker = WalkDir::new(bunch_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(|e| {
            SliceError::io(format!("walking {}", bunch_dir.display()), e.into())
        })?;
        if !entry.file_type().is_file() || is_documentation(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let identifier = VersionIdentifier::parse_in_bunch(&file_name, bunch)?;

        let content = fs::read_to_string(entry.path())
            .map_err(|e| SliceError::io(format!("reading slice {}", entry.path().display()), e))?;
        let lines: Vec<&str> = content.lines().collect();

        let slice = Slice::parse(relative_path(root, entry.path()), identifier, &lines)?;
        if options.accepts(&slice) {
            registry.add(slice)?;
        } else {
            debug!(
                "Slice {} does not support {}",
                slice.relative_path(),
                options.os
            );
        }
    }

    Ok(())
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_documentation(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOC_EXTENSIONS.contains(&ext))
}

/// Root-relative path with `/` separators
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn options(major: u32, os: &str) -> ScanOptions {
        ScanOptions::new(major, os).unwrap()
    }

    #[test]
    fn scans_by_version_major() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "slices-0/a/aaa-1", "OS\ntest");
        write(root, "slices-1/a/aaa-1", "OS\ntest");
        write(root, "slices-1/b/bbb-1", "OS\ntest");
        write(root, "slices-2/b/bbb-1", "OS\ntest");

        let registry = scan_registry(root, &options(1, "test")).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(|s| s.identifier().bunch().major == 1));
    }

    #[test]
    fn skips_hidden_and_documentation_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "slices-1/os/debian-8",
            "OS\ndebian-8\nRUN\napt-get update",
        );
        write(root, "slices-1/os/README.md", "OS\ndebian-8");
        write(root, "slices-1/os/notes.txt", "OS\ndebian-8");
        write(root, "slices-1/os/.hidden", "OS\ndebian-8");
        write(root, "slices-1/.git/config", "OS\ndebian-8");
        write(root, ".staging/slices-1/x", "OS\ndebian-8");

        let registry = scan_registry(root, &options(1, "debian")).unwrap();
        assert_eq!(registry.len(), 1);
        let slice = registry.iter().next().unwrap();
        assert_eq!(slice.relative_path(), "slices-1/os/debian-8");
    }

    #[test]
    fn keeps_only_slices_for_the_os() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "slices-1/debian-8", "OS\ndebian-8");
        write(root, "slices-1/ruby-2.3", "OS\ndebian-8\nalpine-3");
        write(root, "slices-1/apk-tools", "OS\nalpine-3");
        write(root, "slices-1/old-thing", "OS\ndebian-7");
        write(root, "slices-1/generic", "RUN\necho hi");

        let registry = scan_registry(root, &options(1, "debian-8")).unwrap();
        let mut names: Vec<&str> = registry.iter().map(|s| s.identifier().name()).collect();
        names.sort();
        assert_eq!(names, ["debian", "ruby"]);
    }

    #[test]
    fn empty_os_keeps_everything() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "slices-1/debian-8", "OS\ndebian-8");
        write(root, "slices-1/generic", "RUN\necho hi");

        let registry = scan_registry(root, &options(1, "")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_across_folders_is_fatal() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "slices-1/a/ruby-2", "OS\ndebian");
        write(root, "slices-1/b/ruby-2", "OS\ndebian");

        let err = scan_registry(root, &options(1, "debian")).unwrap_err();
        assert!(matches!(err, SliceError::DuplicateSlice { .. }));
    }

    #[test]
    fn malformed_file_name_is_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "slices-1/ruby-2.x", "OS\ndebian");

        let err = scan_registry(temp.path(), &options(1, "debian")).unwrap_err();
        assert!(matches!(err, SliceError::InvalidVersion { .. }));
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = scan_registry(&temp.path().join("nope"), &options(1, "debian")).unwrap_err();
        assert!(matches!(err, SliceError::RegistryNotFound(_)));
    }

    #[test]
    fn result_is_sorted_most_recent_first() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "slices-1.0/ruby-2.1", "OS\ndebian");
        write(root, "slices-1.2/ruby-2.0", "OS\ndebian");

        let registry = scan_registry(root, &options(1, "debian")).unwrap();
        let first = registry.iter().next().unwrap();
        assert_eq!(first.relative_path(), "slices-1.2/ruby-2.0");
    }
}
