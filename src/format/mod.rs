//! Output formatters
//!
//! A formatter renders a list of sections to target syntax. The merged
//! output of a resolution is re-parsed into sections before rendering,
//! so the same formatters also render a single slice.

mod docker;
mod shell;

pub use docker::DockerFormatter;
pub use shell::ShellFormatter;

use crate::error::{SliceError, SliceResult};
use crate::slice::SliceSection;
use std::fmt;

/// Renders sections to text
pub trait Formatter {
    /// Append one section to `out`
    fn write_section(&self, section: &SliceSection, out: &mut String);

    /// Render every section in order
    fn write(&self, sections: &[SliceSection]) -> String {
        let mut out = String::new();
        for section in sections {
            self.write_section(section, &mut out);
        }
        out
    }
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Shell,
    Docker,
}

impl FormatKind {
    /// Match a configuration value by prefix: `d...` is docker, `sh...` is
    /// shell. Anything else selects nothing.
    pub fn from_option(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if value.starts_with('d') {
            Some(Self::Docker)
        } else if value.starts_with("sh") {
            Some(Self::Shell)
        } else {
            None
        }
    }

    /// Like `from_option`, but an unknown value is a configuration error
    pub fn parse(value: &str) -> SliceResult<Self> {
        Self::from_option(value).ok_or_else(|| SliceError::UnknownFormat(value.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "sh",
            Self::Docker => "docker",
        }
    }

    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            Self::Shell => Box::new(ShellFormatter),
            Self::Docker => Box::new(DockerFormatter),
        }
    }

    /// File name of the rendered output for a layer label
    pub fn file_name(self, label: &str) -> String {
        match self {
            Self::Shell => format!("{}.sh", label),
            Self::Docker => "Dockerfile".to_string(),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
