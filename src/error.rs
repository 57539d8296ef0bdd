//! Error types for slicebuild
//!
//! All modules use `SliceResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for slicebuild operations
pub type SliceResult<T> = Result<T, SliceError>;

/// All errors that can occur in slicebuild
#[derive(Error, Debug)]
pub enum SliceError {
    // Registry errors
    #[error("Invalid version label '{label}': {reason}")]
    InvalidVersion { label: String, reason: String },

    #[error("Duplicate slice {identifier} at {path}")]
    DuplicateSlice { identifier: String, path: String },

    #[error("Slice registry not found: {0}")]
    RegistryNotFound(PathBuf),

    // Resolution errors
    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    #[error("Missing slices: {}", .0.join(", "))]
    MissingSlices(Vec<String>),

    #[error("No layers requested")]
    NoLayersRequested,

    // Configuration errors
    #[error("Unknown output format '{0}'. Use sh[ell] or d[ocker]")]
    UnknownFormat(String),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Fetch errors
    #[error("Fetch failed: {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("No release branch found for major version {0}")]
    NoReleaseBranch(u32),

    #[error("Invalid slice archive: {0}")]
    ArchiveInvalid(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Build errors
    #[error("Container runtime '{0}' not found")]
    RuntimeNotFound(String),

    #[error("Image build failed for {tag}: {reason}")]
    ImageBuild { tag: String, reason: String },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SliceError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RegistryNotFound(_) => Some("Run: sb fetch"),
            Self::NoReleaseBranch(_) => {
                Some("Pick a branch explicitly: sb fetch --branch <name>")
            }
            Self::MissingSlices(_) => Some("Run: sb find to list the available slices"),
            Self::RuntimeNotFound(_) => {
                Some("Install docker or run: sb config set build.runtime podman")
            }
            Self::UnknownFormat(_) => Some("Run: sb config set output.format sh"),
            Self::DuplicateSlice { .. } => {
                Some("Remove one of the conflicting slice files or re-run: sb fetch")
            }
            _ => None,
        }
    }
}
