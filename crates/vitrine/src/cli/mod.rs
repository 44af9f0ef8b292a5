//! CLI command handlers.

pub mod config;
pub mod fetch;
pub mod ingest;
pub mod query;

use std::sync::Arc;

use vitrine_core::{ChunkedStore, Config, MetadataIndex, SqliteIndex};

/// Open the store and index from config. A failure here is a connection
/// error and aborts before any file is touched.
pub(crate) async fn connect(
    config: &Config,
) -> anyhow::Result<(Arc<dyn vitrine_core::BlobStore>, Arc<dyn MetadataIndex>)> {
    let store = ChunkedStore::open(config.data_dir(), config.chunk_size()).await?;
    let index_path = config.index_path();
    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let index = SqliteIndex::open(&index_path)?;
    Ok((Arc::new(store), Arc::new(index)))
}
