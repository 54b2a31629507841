//! API error types.

use crate::files::FileError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizvault_metadata::MetadataError;
use quizvault_storage::StorageError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Files(#[from] FileError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("core error: {0}")]
    Core(#[from] quizvault_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
            Self::Files(e) => e.code(),
            Self::Storage(_) => "storage_error",
            Self::Metadata(_) => "metadata_error",
            Self::Core(_) => "core_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Files(e) => file_error_status(e),
            Self::Storage(e) => storage_status(e),
            Self::Metadata(e) => metadata_status(e),
            Self::Core(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn file_error_status(err: &FileError) -> StatusCode {
    match err {
        FileError::PreconditionViolation { .. }
        | FileError::InvalidArea(_)
        | FileError::InvalidPath(_)
        | FileError::InvalidJobId(_)
        | FileError::InvalidFilename(_)
        | FileError::Core(_) => StatusCode::BAD_REQUEST,
        FileError::ArchiveProcessing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FileError::AttemptNotFound { .. }
        | FileError::JobNotFound(_)
        | FileError::JobNotSigned(_)
        | FileError::FileNotFound(_) => StatusCode::NOT_FOUND,
        FileError::ResourceIdMismatch { .. } => StatusCode::FORBIDDEN,
        FileError::Storage(e) => storage_status(e),
        FileError::Metadata(e) => metadata_status(e),
        FileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn metadata_status(err: &MetadataError) -> StatusCode {
    match err {
        MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
        MetadataError::AlreadyExists(_) | MetadataError::WrongArea { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server-side failures may carry storage paths; keep them in the log only.
        let message = if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            code: self.code().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
