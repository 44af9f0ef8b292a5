//! Filesystem-backed chunked blob store.
//!
//! Each blob is a directory named by its id, holding fixed-size chunk
//! files plus a JSON manifest. The manifest is written last: its presence
//! marks a committed blob, so an aborted upload leaves a chunk directory
//! without a manifest and is never served.

use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;

use super::blob::{BlobId, BlobStore, BlobStream, BlobUpload, StoredBlob};

const MANIFEST_FILE: &str = "manifest.json";
const CHUNK_EXT: &str = "chk";

/// Chunked object store rooted at a local directory.
#[derive(Debug)]
pub struct ChunkedStore {
    root: PathBuf,
    chunk_size: usize,
}

impl ChunkedStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// A failure here is a connection error: the run must abort before
    /// any file is processed.
    pub async fn open(root: impl Into<PathBuf>, chunk_size: usize) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Connection {
                path: root.clone(),
                source,
            })?;
        Ok(Self { root, chunk_size })
    }

    fn blob_dir(&self, id: &BlobId) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn chunk_path(dir: &PathBuf, index: usize) -> PathBuf {
        dir.join(format!("{index:06}.{CHUNK_EXT}"))
    }

    /// Load a committed blob's manifest, distinguishing "never committed"
    /// from genuine read faults.
    async fn read_manifest(&self, id: &BlobId) -> Result<StoredBlob, StoreError> {
        let path = self.blob_dir(id).join(MANIFEST_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptManifest {
            id: id.to_string(),
            source,
        })
    }

    /// Sorted chunk file paths for a blob directory.
    async fn chunk_paths(&self, id: &BlobId) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.blob_dir(id);
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut chunks = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CHUNK_EXT) {
                chunks.push(path);
            }
        }
        chunks.sort();
        Ok(chunks)
    }
}

#[async_trait]
impl BlobStore for ChunkedStore {
    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, StoreError> {
        let id = BlobId::assign();
        let dir = self.blob_dir(&id);
        tokio::fs::create_dir_all(&dir).await?;

        let expected = upload.bytes.len() as u64;
        let mut written = 0u64;
        for (index, chunk) in upload.bytes.chunks(self.chunk_size).enumerate() {
            let mut file = tokio::fs::File::create(Self::chunk_path(&dir, index)).await?;
            file.write_all(chunk).await?;
            file.flush().await?;
            file.sync_all().await?;
            written += chunk.len() as u64;
        }

        // Guard against silent completion: no identifier leaves the store
        // unless every byte was flushed.
        if written != expected {
            return Err(StoreError::IncompleteWrite {
                file_name: upload.file_name,
                expected,
                written,
            });
        }

        let blob = StoredBlob {
            id,
            file_name: upload.file_name,
            length: expected,
            upload_date: Utc::now(),
            content_type: upload.content_type,
            tags: upload.tags,
        };

        // Manifest last: commits the blob.
        let mut file = tokio::fs::File::create(dir.join(MANIFEST_FILE)).await?;
        file.write_all(&serde_json::to_vec_pretty(&blob).map_err(std::io::Error::other)?)
            .await?;
        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!(id = %blob.id, file = %blob.file_name, length = blob.length, "stored blob");
        Ok(blob)
    }

    async fn stat(&self, id: &BlobId) -> Result<StoredBlob, StoreError> {
        self.read_manifest(id).await
    }

    async fn open(&self, id: &BlobId) -> Result<(StoredBlob, BlobStream), StoreError> {
        let blob = self.read_manifest(id).await?;
        let chunks = self.chunk_paths(id).await?;
        Ok((blob, BlobStream::new(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BlobTags;
    use crate::types::{CategoryPath, VariantKind};

    fn upload(bytes: &[u8], name: &str) -> BlobUpload {
        BlobUpload::new(
            bytes.to_vec(),
            name,
            "image/jpeg",
            BlobTags::new(&CategoryPath::new("Ribbons"), VariantKind::Thumbnail),
        )
    }

    #[tokio::test]
    async fn test_put_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkedStore::open(dir.path(), 16).await.unwrap();

        let payload: Vec<u8> = (0..100u8).collect();
        let blob = store.put(upload(&payload, "a_thumbnail.jpg")).await.unwrap();
        assert_eq!(blob.length, 100);
        assert_eq!(blob.content_type, "image/jpeg");

        let (stat, stream) = store.open(&blob.id).await.unwrap();
        assert_eq!(stat.file_name, "a_thumbnail.jpg");
        let read = stream.read_all().await.unwrap();
        assert_eq!(&read[..], &payload[..]);
    }

    #[tokio::test]
    async fn test_put_splits_into_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkedStore::open(dir.path(), 16).await.unwrap();

        let blob = store.put(upload(&[7u8; 40], "b.jpg")).await.unwrap();
        // 40 bytes at 16 per chunk: 16 + 16 + 8
        let chunks = store.chunk_paths(&blob.id).await.unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(std::fs::metadata(&chunks[2]).unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_stat_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkedStore::open(dir.path(), 16).await.unwrap();

        let id = BlobId::parse("00000000000000000000000000000000").unwrap();
        let err = store.stat(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_uncommitted_blob_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkedStore::open(dir.path(), 16).await.unwrap();

        // Simulate an aborted upload: chunks on disk, no manifest.
        let blob = store.put(upload(&[1u8; 8], "c.jpg")).await.unwrap();
        std::fs::remove_file(store.blob_dir(&blob.id).join(MANIFEST_FILE)).unwrap();

        let err = store.open(&blob.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_open_unusable_root_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        // Root cannot be created under a regular file.
        let err = ChunkedStore::open(blocker.join("blobs"), 16)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_missing_chunk_surfaces_as_stream_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkedStore::open(dir.path(), 16).await.unwrap();

        let blob = store.put(upload(&[9u8; 40], "d.jpg")).await.unwrap();
        let (_, mut stream) = store.open(&blob.id).await.unwrap();

        // Chunk vanishes mid-transfer.
        let chunks = store.chunk_paths(&blob.id).await.unwrap();
        std::fs::remove_file(&chunks[1]).unwrap();

        assert!(stream.next_chunk().await.unwrap().is_some());
        let err = stream.next_chunk().await.unwrap_err();
        assert!(matches!(err, StoreError::Stream { .. }));
    }

    #[tokio::test]
    async fn test_empty_payload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkedStore::open(dir.path(), 16).await.unwrap();

        let blob = store.put(upload(&[], "empty.jpg")).await.unwrap();
        assert_eq!(blob.length, 0);
        let (_, stream) = store.open(&blob.id).await.unwrap();
        assert!(stream.read_all().await.unwrap().is_empty());
    }
}
