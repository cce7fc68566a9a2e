//! Upload orchestration
//!
//! `UploadService` owns the policy and the selected backend for the life of the
//! process. Each call to `handle_upload` owns its request stream; the stream is
//! dropped on every exit path, including rejection.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use blueprint_core::{StorageBackend, StoragePolicy, StoredObjectRef, DEFAULT_CONTENT_TYPE};
use blueprint_storage::{generate_key, Storage, UploadReader};

use crate::error::UploadError;
use crate::validator::validate;

/// A single upload as received from a client
pub struct UploadRequest {
    /// Filename as declared by the client
    pub filename: String,
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Upload bytes, length unknown in advance
    pub reader: UploadReader,
}

impl UploadRequest {
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        reader: UploadReader,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            reader,
        }
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Upload pipeline over one storage backend
#[derive(Clone)]
pub struct UploadService {
    policy: Arc<StoragePolicy>,
    storage: Arc<dyn Storage>,
}

impl UploadService {
    pub fn new(policy: Arc<StoragePolicy>, storage: Arc<dyn Storage>) -> Self {
        Self { policy, storage }
    }

    pub fn policy(&self) -> &StoragePolicy {
        &self.policy
    }

    pub fn backend(&self) -> StorageBackend {
        self.storage.backend_type()
    }

    /// Validate, name and persist one upload.
    ///
    /// Rejections and an unavailable backend are reported before the stream is
    /// read. On success exactly one object exists under a fresh key; on failure
    /// none does.
    #[tracing::instrument(
        skip(self, request),
        fields(
            filename = %request.filename,
            backend = %self.storage.backend_type(),
        )
    )]
    pub async fn handle_upload(
        &self,
        request: UploadRequest,
    ) -> Result<StoredObjectRef, UploadError> {
        let start = Instant::now();
        let UploadRequest {
            filename,
            content_type,
            reader,
        } = request;

        let validated = validate(&filename, content_type.as_deref(), &self.policy)?;
        self.storage.ensure_available()?;

        let key = generate_key(&validated.extension);
        let content_type = validated
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let stored = self
            .storage
            .store(&key, &content_type, reader, &self.policy)
            .await?;

        tracing::info!(
            key = %key,
            size_bytes = stored.size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(StoredObjectRef {
            filename: validated.name,
            key: key.into_string(),
            locator: stored.locator,
            size: stored.size,
            backend: self.storage.backend_type(),
            content_type,
        })
    }
}
