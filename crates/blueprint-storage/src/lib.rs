//! Blueprint Storage Library
//!
//! This crate provides the storage abstraction for uploaded blueprints and its
//! implementations for the local filesystem and cloud object stores.
//!
//! # Storage key format
//!
//! Keys are flat: a 64 character hex token followed by the upload's extension,
//! e.g. `3f9a...c1.dwg`. Local objects live at `{directory}/{key}`; cloud objects
//! are namespaced under a prefix, `uploads/{key}` by default.
//!
//! Every backend enforces the policy's size ceiling while streaming and leaves
//! nothing behind at the key when a write fails.

pub mod factory;
pub mod keys;
pub(crate) mod limit;
#[cfg(feature = "storage-cloud")]
pub mod cloud;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;
pub mod unconfigured;

// Re-export commonly used types
pub use blueprint_core::StorageBackend;
#[cfg(feature = "storage-cloud")]
pub use cloud::CloudStorage;
pub use factory::create_storage;
pub use keys::{generate_key, StorageKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject, UploadReader};
pub use unconfigured::UnconfiguredStorage;
