//! Semantic-version identifiers for slices and bunches
//!
//! A label such as `Jekyll-3.1.2-beta.1` splits into a lower-cased name
//! (`jekyll`) and a six-slot version `(3, 1, 2, -2, 1, 0)`. Pre-release
//! stages sort below the release they precede, so `rc` < release and
//! `alpha` < `beta` < `rc`.
//!
//! Identifiers created inside a bunch directory also carry the bunch's
//! version, which takes precedence over the name version when ordering.

use crate::error::{SliceError, SliceResult};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Pre-release stage, ordered alpha < beta < rc < release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Alpha = -3,
    Beta = -2,
    Rc = -1,
    #[default]
    Release = 0,
}

impl Stage {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "alpha" => Some(Self::Alpha),
            "beta" => Some(Self::Beta),
            "rc" => Some(Self::Rc),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Release => "",
        }
    }
}

/// Six-slot version: major, minor, patch, stage, pre-release major and minor.
///
/// Field order is the comparison order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub stage: Stage,
    pub pre_major: u32,
    pub pre_minor: u32,
}

impl SemVer {
    /// The all-zero version used when a label has no version suffix
    pub const ZERO: SemVer = SemVer {
        major: 0,
        minor: 0,
        patch: 0,
        stage: Stage::Release,
        pre_major: 0,
        pre_minor: 0,
    };

    /// Flatten to the numeric tuple form, stage encoded as -3..=0
    pub fn as_tuple(&self) -> (u32, u32, u32, i32, u32, u32) {
        (
            self.major,
            self.minor,
            self.patch,
            self.stage as i32,
            self.pre_major,
            self.pre_minor,
        )
    }

    /// Parse the version portion of a label (everything after the name)
    fn parse(label: &str, text: &str) -> SliceResult<Self> {
        let (release, pre) = match text.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (text, None),
        };

        let mut version = SemVer::ZERO;

        let release_slots: Vec<&str> = release.split('.').collect();
        if release_slots.len() > 3 {
            return Err(SliceError::invalid_version(
                label,
                "more than three release components",
            ));
        }
        for (slot, token) in release_slots.iter().enumerate() {
            let value = parse_slot(label, token)?;
            match slot {
                0 => version.major = value,
                1 => version.minor = value,
                _ => version.patch = value,
            }
        }

        if let Some(pre) = pre {
            let mut tokens = pre.split('.');
            let stage_token = tokens.next().unwrap_or_default();
            version.stage = Stage::from_token(stage_token).ok_or_else(|| {
                SliceError::invalid_version(
                    label,
                    format!("unknown pre-release '{}', expected alpha, beta or rc", stage_token),
                )
            })?;

            let pre_slots: Vec<&str> = tokens.collect();
            if pre_slots.len() > 2 {
                return Err(SliceError::invalid_version(
                    label,
                    "more than two pre-release components",
                ));
            }
            for (slot, token) in pre_slots.iter().enumerate() {
                let value = parse_slot(label, token)?;
                if slot == 0 {
                    version.pre_major = value;
                } else {
                    version.pre_minor = value;
                }
            }
        }

        Ok(version)
    }
}

fn parse_slot(label: &str, token: &str) -> SliceResult<u32> {
    if token.is_empty() {
        return Err(SliceError::invalid_version(label, "empty version component"));
    }
    token.parse().map_err(|_| {
        SliceError::invalid_version(label, format!("'{}' is not a number", token))
    })
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.stage != Stage::Release {
            write!(
                f,
                "-{}.{}.{}",
                self.stage.as_str(),
                self.pre_major,
                self.pre_minor
            )?;
        }
        Ok(())
    }
}

/// A parsed `name[-version]` label with its enclosing bunch version.
///
/// Equality, hashing and ordering use `(bunch, version, name)`; the
/// original label is kept only for display.
#[derive(Debug, Clone)]
pub struct VersionIdentifier {
    label: String,
    name: String,
    version: SemVer,
    bunch: SemVer,
}

impl VersionIdentifier {
    /// Parse a label outside of any bunch
    pub fn parse(label: &str) -> SliceResult<Self> {
        Self::parse_in_bunch(label, SemVer::ZERO)
    }

    /// Parse a label found inside a bunch with the given version
    pub fn parse_in_bunch(label: &str, bunch: SemVer) -> SliceResult<Self> {
        let chars: Vec<char> = label.chars().filter(|c| !c.is_whitespace()).collect();

        let mut name = String::new();
        let mut version_text: Option<String> = None;

        for (pos, &ch) in chars.iter().enumerate() {
            let next_is_digit = chars.get(pos + 1).is_some_and(|c| c.is_ascii_digit());
            if (ch == '-' && next_is_digit) || ch == '.' {
                version_text = Some(chars[pos + 1..].iter().collect());
                break;
            }
            name.push(ch);
        }

        let version = match version_text {
            Some(text) => SemVer::parse(label, &text)?,
            None => SemVer::ZERO,
        };

        Ok(Self {
            label: label.to_string(),
            name: name.to_lowercase(),
            version,
            bunch,
        })
    }

    /// A bare name with zero versions, no parsing involved
    pub fn bare(name: &str) -> Self {
        Self {
            label: name.to_string(),
            name: name.to_lowercase(),
            version: SemVer::ZERO,
            bunch: SemVer::ZERO,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> SemVer {
        self.version
    }

    pub fn bunch(&self) -> SemVer {
        self.bunch
    }

    pub fn major(&self) -> u32 {
        self.version.major
    }

    /// Whether this identifier can stand in for `requested`.
    ///
    /// Names must match and the version must be at least the requested
    /// one. Bunch versions are ignored.
    pub fn satisfies(&self, requested: &VersionIdentifier) -> bool {
        self.name == requested.name && self.version >= requested.version
    }

    fn key(&self) -> (SemVer, SemVer, &str) {
        (self.bunch, self.version, &self.name)
    }
}

impl PartialEq for VersionIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for VersionIdentifier {}

impl Hash for VersionIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for VersionIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for VersionIdentifier {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}
