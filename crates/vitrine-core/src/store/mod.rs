//! Chunked blob store: contract and filesystem implementation.

mod blob;
mod chunked;

pub use blob::{BlobId, BlobStore, BlobStream, BlobTags, BlobUpload, StoredBlob};
pub use chunked::ChunkedStore;
