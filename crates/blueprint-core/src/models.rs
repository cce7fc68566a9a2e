//! Result models returned by the upload pipeline

use serde::{Deserialize, Serialize};

use crate::storage_types::StorageBackend;

/// Content type reported when the client did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Reference to a durably stored upload.
///
/// Only produced once the whole stream has been written and its size confirmed
/// to be within policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObjectRef {
    /// Normalized name the client declared for the upload
    pub filename: String,
    /// Storage key the object was written under
    pub key: String,
    /// Path or (time-limited) URL the object can be fetched from
    pub locator: String,
    pub size: u64,
    pub backend: StorageBackend,
    pub content_type: String,
}

/// Success payload returned to upload clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub size: u64,
    pub content_type: String,
    pub url: String,
    pub storage: StorageBackend,
}

impl From<StoredObjectRef> for UploadResponse {
    fn from(object: StoredObjectRef) -> Self {
        Self {
            filename: object.filename,
            size: object.size,
            content_type: object.content_type,
            url: object.locator,
            storage: object.backend,
        }
    }
}
