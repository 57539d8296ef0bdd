//! Slices: versioned build fragments
//!
//! A slice is one file of the registry, parsed into sections. Its `DEP`
//! and `OS` sections name the slices it builds on. Lookups that fail
//! produce a `Missing` slice so resolution can carry on and report every
//! gap at once.

pub mod directory;
pub mod registry;
pub mod section;

pub use directory::{scan_registry, ScanOptions};
pub use registry::SliceRegistry;
pub use section::{parse_section, parse_sections, SectionKind, SliceSection};

use crate::error::SliceResult;
use crate::version::VersionIdentifier;

/// A slice parsed from a registry file
#[derive(Debug, Clone)]
pub struct SliceFile {
    relative_path: String,
    identifier: VersionIdentifier,
    sections: Vec<SliceSection>,
    dependencies: Vec<VersionIdentifier>,
    os: Vec<VersionIdentifier>,
}

impl SliceFile {
    /// Parse file content into a slice.
    ///
    /// Fails if a `DEP` or `OS` entry is not a valid version label.
    pub fn parse<S: AsRef<str>>(
        relative_path: impl Into<String>,
        identifier: VersionIdentifier,
        lines: &[S],
    ) -> SliceResult<Self> {
        let sections = parse_sections(lines);
        let dependencies = collect_identifiers(&sections, SectionKind::Dep)?;
        let os = collect_identifiers(&sections, SectionKind::Os)?;

        Ok(Self {
            relative_path: relative_path.into(),
            identifier,
            sections,
            dependencies,
            os,
        })
    }
}

fn collect_identifiers(
    sections: &[SliceSection],
    kind: SectionKind,
) -> SliceResult<Vec<VersionIdentifier>> {
    let mut identifiers: Vec<VersionIdentifier> = Vec::new();

    for section in sections.iter().filter(|s| s.kind() == kind) {
        for line in section.content_lines() {
            let identifier = VersionIdentifier::parse(line)?;
            if !identifiers.contains(&identifier) {
                identifiers.push(identifier);
            }
        }
    }

    Ok(identifiers)
}

/// A registry slice, or a placeholder standing in for one
#[derive(Debug, Clone)]
pub enum Slice {
    /// Parsed from a registry file
    Found(SliceFile),

    /// A lookup with no satisfying slice; carries the requested identifier
    Missing(VersionIdentifier),

    /// A content-free placeholder with a bare name and zero version
    Empty(VersionIdentifier),
}

impl Slice {
    /// Parse file content into a found slice
    pub fn parse<S: AsRef<str>>(
        relative_path: impl Into<String>,
        identifier: VersionIdentifier,
        lines: &[S],
    ) -> SliceResult<Self> {
        SliceFile::parse(relative_path, identifier, lines).map(Self::Found)
    }

    /// Placeholder with a bare name
    pub fn empty(name: &str) -> Self {
        Self::Empty(VersionIdentifier::bare(name))
    }

    pub fn identifier(&self) -> &VersionIdentifier {
        match self {
            Self::Found(file) => &file.identifier,
            Self::Missing(identifier) | Self::Empty(identifier) => identifier,
        }
    }

    /// Path relative to the registry root; placeholders use their label
    pub fn relative_path(&self) -> &str {
        match self {
            Self::Found(file) => &file.relative_path,
            Self::Missing(identifier) | Self::Empty(identifier) => identifier.label(),
        }
    }

    pub fn sections(&self) -> &[SliceSection] {
        match self {
            Self::Found(file) => &file.sections,
            Self::Missing(_) | Self::Empty(_) => &[],
        }
    }

    /// Identifiers listed in `DEP` sections, deduplicated, comments skipped
    pub fn dependency_identifiers(&self) -> &[VersionIdentifier] {
        match self {
            Self::Found(file) => &file.dependencies,
            Self::Missing(_) | Self::Empty(_) => &[],
        }
    }

    /// Identifiers listed in `OS` sections, deduplicated, comments skipped
    pub fn os_identifiers(&self) -> &[VersionIdentifier] {
        match self {
            Self::Found(file) => &file.os,
            Self::Missing(_) | Self::Empty(_) => &[],
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Whether the `OS` section lists `os` at the requested version or later
    pub fn supports_os(&self, os: &VersionIdentifier) -> bool {
        self.os_identifiers().iter().any(|entry| entry.satisfies(os))
    }
}

impl PartialEq for Slice {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for Slice {}

impl std::hash::Hash for Slice {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JEKYLL: &str = r#"
OS
debian-8
# alpine is not supported yet
ubuntu-14.04

DEP
ruby-2
# bundler ships with ruby
ruby-2

RUN
gem install jekyll

EXPOSE
4000
"#;

    fn jekyll() -> Slice {
        let bunch = VersionIdentifier::parse("slices-1.0").unwrap().version();
        let identifier = VersionIdentifier::parse_in_bunch("jekyll-3.0", bunch).unwrap();
        let lines: Vec<&str> = JEKYLL.lines().collect();
        Slice::parse("slices-1.0/app/jekyll-3.0", identifier, &lines).unwrap()
    }

    #[test]
    fn parses_sections_and_identifiers() {
        let slice = jekyll();
        assert_eq!(slice.relative_path(), "slices-1.0/app/jekyll-3.0");
        assert_eq!(slice.identifier().name(), "jekyll");
        assert_eq!(slice.identifier().bunch().major, 1);
        assert_eq!(slice.sections().len(), 4);

        let deps: Vec<&str> = slice
            .dependency_identifiers()
            .iter()
            .map(|d| d.label())
            .collect();
        assert_eq!(deps, ["ruby-2"]);

        let os: Vec<&str> = slice.os_identifiers().iter().map(|o| o.name()).collect();
        assert_eq!(os, ["debian", "ubuntu"]);
    }

    #[test]
    fn supports_os_by_minimum_version() {
        let slice = jekyll();
        assert!(slice.supports_os(&VersionIdentifier::parse("debian").unwrap()));
        assert!(slice.supports_os(&VersionIdentifier::parse("debian-8").unwrap()));
        assert!(!slice.supports_os(&VersionIdentifier::parse("debian-9").unwrap()));
        assert!(!slice.supports_os(&VersionIdentifier::parse("alpine").unwrap()));
    }

    #[test]
    fn no_header_means_no_metadata() {
        let identifier = VersionIdentifier::parse("notes").unwrap();
        let slice = Slice::parse("notes", identifier, &["apt-get update"]).unwrap();
        assert!(slice.sections().is_empty());
        assert!(slice.dependency_identifiers().is_empty());
        assert!(slice.os_identifiers().is_empty());
    }

    #[test]
    fn malformed_dependency_is_fatal() {
        let identifier = VersionIdentifier::parse("app").unwrap();
        let result = Slice::parse("app", identifier, &["DEP", "ruby-2.x"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_slice_uses_requested_identifier() {
        let requested = VersionIdentifier::parse("item-2").unwrap();
        let slice = Slice::Missing(requested.clone());
        assert!(slice.is_missing());
        assert_eq!(slice.relative_path(), "item-2");
        assert_eq!(slice.identifier().major(), 2);
        assert!(slice.sections().is_empty());
    }

    #[test]
    fn empty_slice_has_zero_version() {
        let slice = Slice::empty("Debian");
        assert!(!slice.is_missing());
        assert_eq!(slice.identifier().name(), "debian");
        assert_eq!(slice.identifier().version().as_tuple(), (0, 0, 0, 0, 0, 0));
        assert!(slice.dependency_identifiers().is_empty());
    }

    #[test]
    fn equality_follows_identifier() {
        let identifier = VersionIdentifier::parse("ruby-2").unwrap();
        let found = Slice::parse("a/ruby-2", identifier.clone(), &["RUN", "x"]).unwrap();
        assert_eq!(found, Slice::Missing(identifier));
    }
}
