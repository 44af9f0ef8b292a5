//! Ingestion orchestration: read, encode, upload, persist, one file at a
//! time.
//!
//! Per-file failure policy: a file that cannot be read is logged and
//! skipped. Everything after the read (decode, upload, index write)
//! aborts the whole run: a mid-pipeline failure signals a corrupt source
//! set or a systemic store/index problem, and continuing would pile up
//! orphaned blobs and inconsistent metadata.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{PipelineError, Result, VitrineError};
use crate::index::MetadataIndex;
use crate::store::{BlobStore, BlobTags, BlobUpload};
use crate::types::{alt_text_from_file_name, ImageRecord, IngestStats, VariantKind};

use super::encode::{EncodedVariants, VariantEncoder, VARIANT_CONTENT_TYPE};
use super::walker::{CategoryWalker, DiscoveredImage};

/// The ingestion orchestrator. Holds its store and index clients as
/// injected dependencies; no process-wide connection state.
pub struct Ingestor {
    store: Arc<dyn BlobStore>,
    index: Arc<dyn MetadataIndex>,
    encoder: VariantEncoder,
    walker: CategoryWalker,
}

impl Ingestor {
    pub fn new(
        config: &Config,
        store: Arc<dyn BlobStore>,
        index: Arc<dyn MetadataIndex>,
    ) -> Self {
        Self {
            store,
            index,
            encoder: VariantEncoder::new(config.variants.clone()),
            walker: CategoryWalker::new(&config.processing.supported_formats),
        }
    }

    /// Run ingestion to completion over `root`.
    ///
    /// Files are fully processed one at a time, in traversal order, and
    /// metadata records are inserted in that same order. Returns summary
    /// counts on success; the first fatal error aborts the run.
    pub async fn run(&self, root: &Path) -> Result<IngestStats> {
        let mut stats = IngestStats::default();

        for item in self.walker.walk(root)? {
            let image = item?;
            match self.ingest_one(&image).await {
                Ok(()) => stats.ingested += 1,
                Err(VitrineError::Pipeline(PipelineError::Unreadable { path, source })) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %source,
                        "Skipping unreadable file"
                    );
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            ingested = stats.ingested,
            skipped = stats.skipped,
            "Ingestion run complete"
        );
        Ok(stats)
    }

    /// Process a single discovered file end to end.
    async fn ingest_one(&self, image: &DiscoveredImage) -> Result<()> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| PipelineError::Unreadable {
                path: image.path.clone(),
                source,
            })?;

        let EncodedVariants {
            thumbnail,
            full,
            placeholder,
            width,
            height,
            format,
        } = self.encoder.encode(bytes, &image.path).await?;

        let file_name = image
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        // Upload both stored variants before the record is built, so the
        // blob references it embeds are guaranteed to resolve.
        let thumbnail_blob = self
            .store
            .put(BlobUpload::new(
                thumbnail,
                variant_file_name(&file_name, VariantKind::Thumbnail),
                VARIANT_CONTENT_TYPE,
                BlobTags::new(&image.categories, VariantKind::Thumbnail),
            ))
            .await?;
        let full_blob = self
            .store
            .put(BlobUpload::new(
                full,
                variant_file_name(&file_name, VariantKind::Full),
                VARIANT_CONTENT_TYPE,
                BlobTags::new(&image.categories, VariantKind::Full),
            ))
            .await?;

        let record = ImageRecord {
            id: None,
            alt_text: alt_text_from_file_name(&file_name),
            file_name,
            category: image.categories.category().to_string(),
            subcategory: image.categories.subcategory().map(str::to_string),
            sub_subcategory: image.categories.sub_subcategory().map(str::to_string),
            thumbnail_blob_id: thumbnail_blob.id,
            full_blob_id: full_blob.id,
            placeholder,
            width: Some(width),
            height: Some(height),
            format,
            created_at: Utc::now(),
        };

        // Exactly one insert attempt, never retried.
        let record_id = self.index.insert(&record).await?;

        tracing::info!(
            record = %record_id,
            path = %image.path.display(),
            categories = %image.categories,
            "Ingested image"
        );
        Ok(())
    }
}

/// Logical blob filename: source stem, variant kind, and the re-encoded
/// extension.
fn variant_file_name(file_name: &str, kind: VariantKind) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(s, _)| s)
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name);
    format!("{stem}_{kind}.jpg")
}
