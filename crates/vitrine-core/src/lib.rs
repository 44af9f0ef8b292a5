//! Vitrine Core - image ingestion pipeline over a chunked blob store and
//! a metadata index.
//!
//! # Architecture
//!
//! ```text
//! Category tree → Walker → Ingestor → { Variant Encoder, Blob Store ×2 } → Metadata Index
//! ```
//!
//! The walker enumerates a three-level category tree, the encoder derives
//! thumbnail/full/placeholder variants per source image, the orchestrator
//! uploads the two stored variants into the chunked blob store and then
//! persists one metadata record per image. The read side (`MediaService`)
//! answers category-filtered metadata queries and streams blob bytes back
//! by opaque id.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine_core::{ChunkedStore, Config, Ingestor, SqliteIndex};
//!
//! #[tokio::main]
//! async fn main() -> vitrine_core::Result<()> {
//!     let config = Config::load()?;
//!     let store = Arc::new(ChunkedStore::open(config.data_dir(), config.chunk_size()).await?);
//!     let index = Arc::new(SqliteIndex::open(&config.index_path())?);
//!
//!     let ingestor = Ingestor::new(&config, store, index);
//!     let stats = ingestor.run("./photos".as_ref()).await?;
//!     println!("Ingested {} images", stats.ingested);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod serve;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{
    ConfigError, IndexError, PipelineError, Result, ServeError, StoreError,
    VitrineError,
};
pub use index::{MetadataIndex, RecordFilter, SqliteIndex};
pub use pipeline::{CategoryWalker, Ingestor, VariantEncoder};
pub use serve::MediaService;
pub use store::{BlobId, BlobStore, BlobStream, BlobTags, BlobUpload, ChunkedStore, StoredBlob};
pub use types::{CategoryPath, ImageRecord, IngestStats, RecordId, VariantKind};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
