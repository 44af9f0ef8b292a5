//! The ingestion pipeline: category walking, variant encoding, and the
//! orchestrator that ties them to the blob store and metadata index.

pub mod encode;
pub mod ingest;
pub mod walker;

pub use encode::{EncodedVariants, VariantEncoder, VARIANT_CONTENT_TYPE};
pub use ingest::Ingestor;
pub use walker::{CategoryWalker, DiscoveredImage, ImageWalk};
