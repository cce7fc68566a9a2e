//! Placeholder for a backend that was selected but cannot be built.
//!
//! Startup does not fail when, for example, cloud storage is selected without
//! a bucket. Every operation reports `BackendUnavailable` instead, and the
//! upload service checks `ensure_available` before touching the upload stream.

use async_trait::async_trait;
use blueprint_core::StoragePolicy;

use crate::keys::StorageKey;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject, UploadReader};
use crate::StorageBackend;

#[derive(Debug, Clone)]
pub struct UnconfiguredStorage {
    backend: StorageBackend,
    reason: String,
}

impl UnconfiguredStorage {
    pub fn new(backend: StorageBackend, reason: impl Into<String>) -> Self {
        Self {
            backend,
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> StorageError {
        StorageError::BackendUnavailable(self.reason.clone())
    }
}

#[async_trait]
impl Storage for UnconfiguredStorage {
    fn backend_type(&self) -> StorageBackend {
        self.backend
    }

    fn ensure_available(&self) -> StorageResult<()> {
        Err(self.unavailable())
    }

    async fn store(
        &self,
        _key: &StorageKey,
        _content_type: &str,
        _reader: UploadReader,
        _policy: &StoragePolicy,
    ) -> StorageResult<StoredObject> {
        Err(self.unavailable())
    }

    async fn download(&self, _key: &str) -> StorageResult<Vec<u8>> {
        Err(self.unavailable())
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Err(self.unavailable())
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Err(self.unavailable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_key;

    #[tokio::test]
    async fn every_operation_reports_unavailable() {
        let storage = UnconfiguredStorage::new(StorageBackend::Cloud, "GCS_BUCKET not configured");
        assert_eq!(storage.backend_type(), StorageBackend::Cloud);

        assert!(matches!(
            storage.ensure_available(),
            Err(StorageError::BackendUnavailable(ref reason)) if reason == "GCS_BUCKET not configured"
        ));

        let key = generate_key(".pdf");
        let reader: UploadReader = Box::pin(&b"%PDF"[..]);
        let result = storage
            .store(&key, "application/pdf", reader, &StoragePolicy::default())
            .await;
        assert!(matches!(result, Err(StorageError::BackendUnavailable(_))));

        assert!(storage.download(key.as_str()).await.is_err());
        assert!(storage.delete(key.as_str()).await.is_err());
        assert!(storage.exists(key.as_str()).await.is_err());
    }
}
