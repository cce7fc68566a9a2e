//! Blueprint Core Library
//!
//! This crate provides the types shared by every Blueprint component: the storage
//! backend kind, the upload policy, configuration loading, error metadata and the
//! result models returned to callers.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod storage_types;

// Re-export commonly used types
pub use config::{CloudProvider, UploadConfig};
pub use error::{ErrorMetadata, LogLevel};
pub use models::{StoredObjectRef, UploadResponse, DEFAULT_CONTENT_TYPE};
pub use policy::{ContentTypeRule, StoragePolicy};
pub use storage_types::StorageBackend;
