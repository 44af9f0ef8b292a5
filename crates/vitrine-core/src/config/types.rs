//! Sub-configuration structs with defaults matching the pipeline policies.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Blob store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the chunked blob store
    pub data_dir: PathBuf,

    /// Chunk size in KiB for streamed writes
    pub chunk_size_kb: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.vitrine/blobs"),
            chunk_size_kb: 255,
        }
    }
}

/// Metadata index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Path to the index database file
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~/.vitrine/index.db"),
        }
    }
}

/// Resize/re-encode policy for a stored variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VariantPolicy {
    /// Maximum output width in pixels; sources narrower than this are
    /// never upscaled
    pub max_width: u32,

    /// JPEG re-encode quality (1-100)
    pub quality: u8,
}

/// Policy for the inline low-quality placeholder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaceholderPolicy {
    /// Output width in pixels (forced, unlike the stored variants)
    pub width: u32,

    /// JPEG re-encode quality (1-100)
    pub quality: u8,

    /// Gaussian blur sigma applied before encoding
    pub blur_sigma: f32,
}

/// Variant derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantsConfig {
    /// Thumbnail variant policy
    pub thumbnail: VariantPolicy,

    /// Full-size variant policy
    pub full: VariantPolicy,

    /// Inline placeholder policy
    pub placeholder: PlaceholderPolicy,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            thumbnail: VariantPolicy {
                max_width: 600,
                quality: 75,
            },
            full: VariantPolicy {
                max_width: 1600,
                quality: 82,
            },
            placeholder: PlaceholderPolicy {
                width: 20,
                quality: 30,
                blur_sigma: 1.2,
            },
        }
    }
}

/// Ingestion traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Accepted file extensions, matched case-insensitively
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
