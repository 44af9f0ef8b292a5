//! Core data types for the Vitrine ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::BlobId;

/// The three-level classification derived from directory structure.
///
/// A sub-subcategory is only meaningful underneath a subcategory, so the
/// fields are private and the constructors enforce the nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPath {
    category: String,
    subcategory: Option<String>,
    sub_subcategory: Option<String>,
}

impl CategoryPath {
    /// A top-level category with no deeper levels.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: None,
            sub_subcategory: None,
        }
    }

    /// A category/subcategory pair.
    pub fn with_sub(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: Some(subcategory.into()),
            sub_subcategory: None,
        }
    }

    /// The full three-level path.
    pub fn with_sub_sub(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        sub_subcategory: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: Some(subcategory.into()),
            sub_subcategory: Some(sub_subcategory.into()),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn sub_subcategory(&self) -> Option<&str> {
        self.sub_subcategory.as_deref()
    }
}

impl std::fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category)?;
        if let Some(sub) = &self.subcategory {
            write!(f, "/{}", sub)?;
        }
        if let Some(subsub) = &self.sub_subcategory {
            write!(f, "/{}", subsub)?;
        }
        Ok(())
    }
}

/// Which derivative of a source image a buffer or blob represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Thumbnail,
    Full,
    /// Tiny blurred preview, embedded inline and never stored as a blob
    Placeholder,
}

impl VariantKind {
    /// Stable string name used in blob tags and logical filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Thumbnail => "thumbnail",
            VariantKind::Full => "full",
            VariantKind::Placeholder => "placeholder",
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier assigned by the metadata index on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One metadata record per successfully ingested source image.
///
/// Created once, never mutated. The blob id fields are non-owning
/// references: the orchestrator uploads both blobs before the record is
/// written, so they resolve at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Index-assigned id, `None` until inserted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    /// Original filename of the source image
    pub file_name: String,

    /// Human-readable alt text derived from the filename
    pub alt_text: String,

    /// Top-level category (required)
    pub category: String,

    /// Second-level category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    /// Third-level category, only meaningful with a subcategory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_subcategory: Option<String>,

    /// Blob id of the thumbnail variant
    pub thumbnail_blob_id: BlobId,

    /// Blob id of the full variant
    pub full_blob_id: BlobId,

    /// Inline data URI for the low-quality placeholder
    pub placeholder: String,

    /// Original width in pixels, if determinable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Original height in pixels, if determinable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Original format ("jpeg", "png", ...), if determinable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Summary counts for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Files that reached the index
    pub ingested: usize,

    /// Files skipped because they could not be read
    pub skipped: usize,
}

/// Derive human-readable alt text from a filename: drop the extension,
/// turn separators into spaces, collapse runs of whitespace.
pub fn alt_text_from_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(s, _)| s)
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name);

    let cleaned: String = stem
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();

    let text = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        file_name.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_path_levels() {
        let leaf = CategoryPath::new("Ribbons");
        assert_eq!(leaf.category(), "Ribbons");
        assert_eq!(leaf.subcategory(), None);
        assert_eq!(leaf.sub_subcategory(), None);

        let two = CategoryPath::with_sub("Ribbons", "Velvet");
        assert_eq!(two.subcategory(), Some("Velvet"));
        assert_eq!(two.sub_subcategory(), None);

        let three = CategoryPath::with_sub_sub("Ribbons", "Velvet", "Wide");
        assert_eq!(three.sub_subcategory(), Some("Wide"));
        assert_eq!(three.to_string(), "Ribbons/Velvet/Wide");
    }

    #[test]
    fn test_variant_kind_names() {
        assert_eq!(VariantKind::Thumbnail.as_str(), "thumbnail");
        assert_eq!(VariantKind::Full.as_str(), "full");
        assert_eq!(VariantKind::Placeholder.as_str(), "placeholder");
    }

    #[test]
    fn test_alt_text_from_file_name() {
        assert_eq!(alt_text_from_file_name("red-velvet_ribbon.jpg"), "red velvet ribbon");
        assert_eq!(alt_text_from_file_name("a.jpg"), "a");
        assert_eq!(alt_text_from_file_name("no_extension"), "no extension");
        // A filename that cleans down to nothing falls back to itself
        assert_eq!(alt_text_from_file_name("_.jpg"), "_.jpg");
    }

    #[test]
    fn test_variant_kind_serde_lowercase() {
        let json = serde_json::to_string(&VariantKind::Thumbnail).unwrap();
        assert_eq!(json, "\"thumbnail\"");
        let parsed: VariantKind = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(parsed, VariantKind::Full);
    }
}
