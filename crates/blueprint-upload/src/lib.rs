//! Blueprint Upload Library
//!
//! The upload pipeline: validate the declared name and content type against the
//! policy, generate a storage key, stream the bytes to the configured backend and
//! describe the stored object. Errors render as HTTP responses.

pub mod error;
pub mod service;
pub mod validator;

pub use error::{ErrorResponse, UploadError};
pub use service::{UploadRequest, UploadService};
pub use validator::{validate, RejectionError, ValidatedUpload};
