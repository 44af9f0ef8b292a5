//! Error types for the Vitrine ingestion pipeline.
//!
//! Errors are organized by area. Only `PipelineError::Unreadable` is
//! recovered per file; everything else propagates to the top-level run
//! boundary and aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Vitrine operations.
#[derive(Error, Debug)]
pub enum VitrineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Blob store errors
    #[error("Blob store error: {0}")]
    Store(#[from] StoreError),

    /// Metadata index errors
    #[error("Metadata index error: {0}")]
    Index(#[from] IndexError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file could not be read. The only per-file-recoverable
    /// class: the orchestrator logs it, skips the file, and continues.
    #[error("Unreadable file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image decoding failed. Fatal: aborts the run.
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Variant re-encoding failed. Fatal: aborts the run.
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Category tree enumeration failed
    #[error("Walk error under {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Blob store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not open the store at process start. Aborts the run
    /// before any file is processed.
    #[error("Blob store connection failed for {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write or read fault while talking to the store
    #[error("Blob store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write path completed but the flushed byte count does not
    /// match the input. No identifier is returned; already-written
    /// chunks are left orphaned.
    #[error("Upload of {file_name} completed without a full flush: wrote {written} of {expected} bytes")]
    IncompleteWrite {
        file_name: String,
        expected: u64,
        written: u64,
    },

    /// The identifier is not in the store's id format
    #[error("Malformed blob id: {0}")]
    MalformedId(String),

    /// No committed blob exists under the identifier
    #[error("No blob found for id {0}")]
    NotFound(String),

    /// The blob's manifest exists but cannot be parsed
    #[error("Corrupt manifest for blob {id}: {source}")]
    CorruptManifest {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Read fault mid-transfer while streaming a stored blob
    #[error("Blob stream fault at {path}: {source}")]
    Stream {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Metadata index errors.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Could not open the index. Aborts the run before any file is
    /// processed.
    #[error("Metadata index connection failed: {source}")]
    Connection {
        #[source]
        source: rusqlite::Error,
    },

    /// Record insert failed. Fatal: aborts the run.
    #[error("Metadata index write failed: {source}")]
    Write {
        #[source]
        source: rusqlite::Error,
    },

    /// Query failed
    #[error("Metadata index query failed: {source}")]
    Query {
        #[source]
        source: rusqlite::Error,
    },

    /// The connection lock was poisoned by a panicking holder
    #[error("Metadata index lock poisoned")]
    Poisoned,
}

/// Read-side service errors, mapped for the wrapping HTTP layer.
#[derive(Error, Debug)]
pub enum ServeError {
    /// The client supplied an id that is not in the store's format
    #[error("Malformed blob id: {id}")]
    BadRequest { id: String },

    /// No blob matches the (well-formed) id
    #[error("No blob found for id {id}")]
    NotFound { id: String },

    /// The underlying blob stream faulted mid-transfer
    #[error("Blob stream failed: {0}")]
    Stream(StoreError),

    /// The metadata query failed
    #[error("Metadata query failed: {0}")]
    Query(#[from] IndexError),
}

/// Convenience type alias for Vitrine results.
pub type Result<T> = std::result::Result<T, VitrineError>;
