//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use std::pin::Pin;

use async_trait::async_trait;
use blueprint_core::StoragePolicy;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::keys::StorageKey;
use crate::StorageBackend;

/// Byte stream of an upload, length unknown in advance
pub type UploadReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a successful `store`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path or URL the object can be fetched from
    pub locator: String,
    /// Exact number of bytes written
    pub size: u64,
}

/// Storage abstraction trait
///
/// All storage backends (local filesystem, cloud object store) implement this
/// trait so the upload service can persist blueprints without coupling to a
/// specific destination. Implementations must be safe to share across
/// concurrent uploads.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Fail fast when the backend cannot accept uploads (e.g. missing bucket).
    ///
    /// Called before any byte of an upload is read.
    fn ensure_available(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Stream `reader` to storage under `key`.
    ///
    /// Reading stops as soon as more than `policy.max_size()` bytes were seen,
    /// in which case `PayloadTooLarge` is returned. On any error nothing is left
    /// stored under `key`.
    async fn store(
        &self,
        key: &StorageKey,
        content_type: &str,
        reader: UploadReader,
        policy: &StoragePolicy,
    ) -> StorageResult<StoredObject>;

    /// Download a file by its storage key
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
