//! Configuration schema for slicebuild
//!
//! Configuration is stored at `~/.config/slicebuild/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Local slice registry
    pub registry: RegistryConfig,

    /// Rendered output
    pub output: OutputConfig,

    /// Registry download
    pub fetch: FetchConfig,

    /// Image test builds
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Slice registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding the bunch directories
    pub root: PathBuf,

    /// Bunch major version to read; defaults to the tool's own major
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<u32>,

    /// OS used when a command is not given one
    pub os: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: data_dir().join("slices"),
            major: None,
            os: "debian".to_string(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Formatter: "sh[ell]" or "d[ocker]"
    pub format: String,

    /// Directory for generated files
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "sh".to_string(),
            dir: data_dir().join("out"),
        }
    }
}

/// Slice archive download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// GitHub API endpoint listing the slice repository branches
    pub branches_url: String,

    /// Archive URL template; `{branch}` is replaced by the branch name
    pub archive_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            branches_url: "https://api.github.com/repos/slicebuild/slices/branches".to_string(),
            archive_url: "https://github.com/slicebuild/slices/archive/{branch}.tar.gz"
                .to_string(),
        }
    }
}

/// Image test build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Container CLI used for builds
    pub runtime: String,

    /// Prefix for test image tags
    pub tag_prefix: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            tag_prefix: "sb-test".to_string(),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slicebuild")
}
