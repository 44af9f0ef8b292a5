//! Blob store contract: opaque ids, upload/stat/open operations, and the
//! chunked read stream.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{CategoryPath, VariantKind};

/// Opaque, store-assigned blob identifier.
///
/// Rendered as a 32-character hex string; anything else fails `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobId(Uuid);

impl BlobId {
    /// Assign a fresh identifier. Only the store creates these.
    pub(crate) fn assign() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied identifier string.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| StoreError::MalformedId(s.to_string()))
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for BlobId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlobId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BlobId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Tag set attached to every stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobTags {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_subcategory: Option<String>,
    pub variant: VariantKind,
}

impl BlobTags {
    pub fn new(categories: &CategoryPath, variant: VariantKind) -> Self {
        Self {
            category: categories.category().to_string(),
            subcategory: categories.subcategory().map(str::to_string),
            sub_subcategory: categories.sub_subcategory().map(str::to_string),
            variant,
        }
    }
}

/// One pending upload: buffer plus descriptive metadata.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: String,
    pub tags: BlobTags,
}

impl BlobUpload {
    pub fn new(
        bytes: impl Into<Bytes>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        tags: BlobTags,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            tags,
        }
    }
}

/// Descriptor for a committed blob. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBlob {
    pub id: BlobId,
    pub file_name: String,
    pub length: u64,
    pub upload_date: DateTime<Utc>,
    pub content_type: String,
    pub tags: BlobTags,
}

/// A chunked object store addressed by opaque identifiers.
///
/// `put` must not return until the write is fully flushed; on any
/// write-time fault no identifier is returned and partial chunks are the
/// store's problem, not the caller's.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a buffer as a new object and return its descriptor once the
    /// write is fully flushed and acknowledged.
    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, StoreError>;

    /// Look up the descriptor for a committed blob.
    async fn stat(&self, id: &BlobId) -> Result<StoredBlob, StoreError>;

    /// Open a committed blob for chunked streaming reads.
    async fn open(&self, id: &BlobId) -> Result<(StoredBlob, BlobStream), StoreError>;
}

/// Streamed read over a blob's chunk files, in order.
#[derive(Debug)]
pub struct BlobStream {
    chunks: VecDeque<PathBuf>,
}

impl BlobStream {
    pub(crate) fn new(chunks: Vec<PathBuf>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    /// Yield the next chunk, or `None` when the blob is exhausted.
    ///
    /// A read fault mid-transfer surfaces as `StoreError::Stream`.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, StoreError> {
        let Some(path) = self.chunks.pop_front() else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| StoreError::Stream { path, source })?;
        Ok(Some(Bytes::from(bytes)))
    }

    /// Drain the stream into a single buffer.
    pub async fn read_all(mut self) -> Result<Bytes, StoreError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_id_display_roundtrip() {
        let id = BlobId::assign();
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 32);
        let parsed = BlobId::parse(&rendered).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_blob_id_rejects_malformed() {
        let err = BlobId::parse("not-a-blob-id").unwrap_err();
        assert!(matches!(err, StoreError::MalformedId(_)));
    }

    #[test]
    fn test_blob_id_serde_as_string() {
        let id = BlobId::assign();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let parsed: BlobId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_blob_tags_from_category_path() {
        let tags = BlobTags::new(
            &CategoryPath::with_sub("Ribbons", "Velvet"),
            VariantKind::Thumbnail,
        );
        assert_eq!(tags.category, "Ribbons");
        assert_eq!(tags.subcategory.as_deref(), Some("Velvet"));
        assert_eq!(tags.sub_subcategory, None);
        assert_eq!(tags.variant, VariantKind::Thumbnail);
    }
}
