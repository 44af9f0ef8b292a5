//! Read-side service: metadata queries and blob streaming by opaque id.
//!
//! This is the library-level contract an HTTP layer wraps: errors are
//! already split into client (malformed id), not-found, and server
//! (stream fault) classes.

use std::sync::Arc;

use crate::error::{ServeError, StoreError};
use crate::index::{MetadataIndex, RecordFilter};
use crate::store::{BlobId, BlobStore, BlobStream, StoredBlob};
use crate::types::ImageRecord;

/// Cache directive for served blob bytes. Blobs are immutable, so the
/// wrapping layer can cache them indefinitely.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Read-side facade over the blob store and metadata index.
pub struct MediaService {
    store: Arc<dyn BlobStore>,
    index: Arc<dyn MetadataIndex>,
}

impl MediaService {
    pub fn new(store: Arc<dyn BlobStore>, index: Arc<dyn MetadataIndex>) -> Self {
        Self { store, index }
    }

    /// Query metadata records by category hierarchy, newest first.
    pub async fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>, ServeError> {
        Ok(self.index.query(filter).await?)
    }

    /// Open a blob for streaming by its client-supplied id string.
    pub async fn open_blob(&self, id: &str) -> Result<(StoredBlob, BlobStream), ServeError> {
        let blob_id = BlobId::parse(id).map_err(|_| ServeError::BadRequest {
            id: id.to_string(),
        })?;
        match self.store.open(&blob_id).await {
            Ok(opened) => Ok(opened),
            Err(StoreError::NotFound(id)) => Err(ServeError::NotFound { id }),
            Err(e) => Err(ServeError::Stream(e)),
        }
    }
}
