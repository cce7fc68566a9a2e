//! Upload error taxonomy and its HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blueprint_core::{ErrorMetadata, LogLevel};
use blueprint_storage::StorageError;
use serde::Serialize;

use crate::validator::RejectionError;

/// Everything `handle_upload` can fail with
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] RejectionError),

    #[error("Upload exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Storage I/O failure")]
    IoFailure(#[source] StorageError),
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PayloadTooLarge { limit } => UploadError::PayloadTooLarge { limit },
            StorageError::BackendUnavailable(reason) => UploadError::BackendUnavailable(reason),
            other => UploadError::IoFailure(other),
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        UploadError::Rejected(RejectionError::UnsupportedExtension(_)) => (
            415,
            "UNSUPPORTED_EXTENSION",
            false,
            Some("Upload a PDF, CAD or image file"),
            false,
            LogLevel::Debug,
        ),
        UploadError::Rejected(RejectionError::UnsupportedContentType(_)) => (
            415,
            "UNSUPPORTED_CONTENT_TYPE",
            false,
            Some("Send a content type matching the file extension"),
            false,
            LogLevel::Debug,
        ),
        UploadError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the file size and try again"),
            false,
            LogLevel::Warn,
        ),
        UploadError::BackendUnavailable(_) => (
            500,
            "STORAGE_UNAVAILABLE",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        UploadError::IoFailure(_) => (
            502,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl UploadError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            UploadError::Rejected(_) => "Rejected",
            UploadError::PayloadTooLarge { .. } => "PayloadTooLarge",
            UploadError::BackendUnavailable(_) => "BackendUnavailable",
            UploadError::IoFailure(_) => "IoFailure",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }
        details
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Rejected(err) => err.to_string(),
            UploadError::PayloadTooLarge { .. } => self.to_string(),
            UploadError::BackendUnavailable(_) => "Storage is not configured".to_string(),
            UploadError::IoFailure(_) => "Failed to store upload".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    /// Build the body for `error`, with internals only when `detailed` is set.
    pub fn from_error(error: &UploadError, detailed: bool) -> Self {
        let detailed = detailed && !error.is_sensitive();
        Self {
            error: error.client_message(),
            details: detailed.then(|| error.detailed_message()),
            error_type: detailed.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

fn log_error(error: &UploadError) {
    let error_type = error.error_type();
    let details = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %details, error_type = error_type, "Upload refused");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %details, error_type = error_type, "Upload refused");
        }
        LogLevel::Error => {
            tracing::error!(error = %details, error_type = error_type, "Upload failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self);

        let body = ErrorResponse::from_error(&self, !is_production_env());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                UploadError::from(RejectionError::UnsupportedExtension(".exe".into())),
                415,
            ),
            (
                UploadError::from(RejectionError::UnsupportedContentType("text/html".into())),
                415,
            ),
            (
                UploadError::from(StorageError::PayloadTooLarge { limit: 10 }),
                413,
            ),
            (
                UploadError::from(StorageError::BackendUnavailable("no bucket".into())),
                500,
            ),
            (
                UploadError::from(StorageError::UploadFailed("disk full".into())),
                502,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.http_status_code(), status, "{error:?}");
            assert_eq!(error.into_response().status().as_u16(), status);
        }
    }

    #[test]
    fn test_io_failure_keeps_cause() {
        let error = UploadError::from(StorageError::UploadFailed("disk full".into()));
        assert!(matches!(error, UploadError::IoFailure(_)));
        assert!(error.detailed_message().contains("disk full"));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let error = UploadError::from(StorageError::UploadFailed("/var/data: EACCES".into()));
        let body = ErrorResponse::from_error(&error, true);
        assert_eq!(body.error, "Failed to store upload");
        assert!(body.details.is_none());
        assert_eq!(body.code, "STORAGE_ERROR");
    }

    #[test]
    fn test_client_errors_include_details_outside_production() {
        let error = UploadError::from(RejectionError::UnsupportedExtension(".exe".into()));
        let body = ErrorResponse::from_error(&error, true);
        assert_eq!(body.error, "Unsupported file extension: .exe");
        assert_eq!(body.error_type.as_deref(), Some("Rejected"));

        let json = serde_json::to_value(ErrorResponse::from_error(&error, false)).unwrap();
        assert_eq!(json["code"], "UNSUPPORTED_EXTENSION");
        assert!(json.get("details").is_none());
    }
}
