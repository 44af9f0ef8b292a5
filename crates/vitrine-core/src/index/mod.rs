//! Metadata index: contract and SQLite-backed implementation.

mod sqlite;

pub use sqlite::SqliteIndex;

use async_trait::async_trait;

use crate::error::IndexError;
use crate::types::{ImageRecord, RecordId};

/// Filter for metadata queries: equality on the category hierarchy plus
/// an optional result limit. Results are always sorted newest-first.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub sub_subcategory: Option<String>,
    pub limit: Option<u32>,
}

/// A document store holding one record per ingested source image.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Insert a record and return the generated id. Attempted exactly
    /// once per image by the orchestrator; never retried.
    async fn insert(&self, record: &ImageRecord) -> Result<RecordId, IndexError>;

    /// Query records by category hierarchy, newest first.
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>, IndexError>;

    /// Count records matching a filter (limit is ignored).
    async fn count(&self, filter: &RecordFilter) -> Result<u64, IndexError>;
}
