//! Configuration management for Vitrine.
//!
//! Configuration is loaded from a TOML file with sensible defaults; the
//! defaults encode the variant policies the pipeline ships with.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Vitrine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blob store settings
    pub storage: StorageConfig,

    /// Metadata index settings
    pub index: IndexConfig,

    /// Variant derivation settings
    pub variants: VariantsConfig,

    /// Ingestion traversal settings
    pub processing: ProcessingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// ~/.vitrine/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "vitrine", "vitrine")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".vitrine").join("config.toml")
            })
    }

    /// Get the resolved blob store directory (with ~ expansion).
    pub fn data_dir(&self) -> PathBuf {
        let path_str = self.storage.data_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Get the resolved index database path (with ~ expansion).
    pub fn index_path(&self) -> PathBuf {
        let path_str = self.index.path.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Chunk size in bytes for streamed blob writes.
    pub fn chunk_size(&self) -> usize {
        self.storage.chunk_size_kb * 1024
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.variants.thumbnail.max_width, 600);
        assert_eq!(config.variants.thumbnail.quality, 75);
        assert_eq!(config.variants.full.max_width, 1600);
        assert_eq!(config.variants.full.quality, 82);
        assert_eq!(config.variants.placeholder.width, 20);
        assert_eq!(config.variants.placeholder.quality, 30);
        assert_eq!(config.storage.chunk_size_kb, 255);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[storage]"));
        assert!(toml.contains("[variants.thumbnail]"));
    }

    #[test]
    fn test_chunk_size_in_bytes() {
        let config = Config::default();
        assert_eq!(config.chunk_size(), 255 * 1024);
    }

    #[test]
    fn test_default_formats() {
        let config = Config::default();
        assert_eq!(
            config.processing.supported_formats,
            vec!["jpg", "jpeg", "png", "webp"]
        );
    }
}
