//! Configuration management for slicebuild

pub mod schema;

pub use schema::Config;

use crate::error::{SliceError, SliceResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slicebuild")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub async fn load(&self) -> SliceResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> SliceResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SliceError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SliceError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SliceResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SliceError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SliceResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SliceError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Major version of this build, the default bunch compatibility gate
pub fn tool_major() -> SliceResult<u32> {
    let version = semver::Version::parse(env!("CARGO_PKG_VERSION"))
        .map_err(|e| SliceError::Internal(format!("invalid package version: {}", e)))?;
    u32::try_from(version.major).map_err(|_| {
        SliceError::Internal(format!("major version {} out of range", version.major))
    })
}

impl Config {
    /// Bunch major version to scan: the configured one or the tool's own
    pub fn registry_major(&self) -> SliceResult<u32> {
        match self.registry.major {
            Some(major) => Ok(major),
            None => tool_major(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.registry.os, "debian");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.registry.os = "alpine-3".to_string();
        config.registry.major = Some(2);

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.registry.os, "alpine-3");
        assert_eq!(loaded.registry_major().unwrap(), 2);
    }

    #[tokio::test]
    async fn invalid_file_is_reported_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[registry\nroot =").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, SliceError::ConfigInvalid { .. }));
    }

    #[test]
    fn default_major_follows_package_version() {
        let config = Config::default();
        let expected: u32 = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap();
        assert_eq!(config.registry_major().unwrap(), expected);
    }
}
