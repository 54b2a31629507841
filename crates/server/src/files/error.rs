//! File pipeline error types.

use quizvault_core::JobId;
use quizvault_metadata::MetadataError;
use quizvault_storage::StorageError;
use thiserror::Error;

/// Errors raised by the artifact, extraction, virtual file and janitor operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// Source file is not in the area the operation requires.
    #[error("file must be in the '{expected}' area, found '{actual}'")]
    PreconditionViolation {
        expected: &'static str,
        actual: String,
    },

    /// The archive stream is not a readable tar+gzip container.
    #[error("Error processing archive file: {0}")]
    ArchiveProcessing(String),

    /// The archive is readable but holds no data for the attempt.
    #[error("Attempt not found: {attempt_id}")]
    AttemptNotFound { attempt_id: u64 },

    #[error("invalid file area: {0}")]
    InvalidArea(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid job id: {0}")]
    InvalidJobId(String),

    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// An identity segment of the request disagrees with the job ledger.
    #[error("resource id mismatch: {field}")]
    ResourceIdMismatch { field: &'static str },

    #[error("No TSP data found for job {0}")]
    JobNotSigned(JobId),

    #[error("file not found: {0}")]
    FileNotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("core error: {0}")]
    Core(#[from] quizvault_core::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FileError {
    /// Stable machine-readable kind of this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PreconditionViolation { .. } => "precondition_violation",
            Self::ArchiveProcessing(_) => "archive_processing_error",
            Self::AttemptNotFound { .. } => "attempt_not_found",
            Self::InvalidArea(_) => "invalid_area",
            Self::InvalidPath(_) => "invalid_path",
            Self::InvalidJobId(_) => "invalid_job_id",
            Self::InvalidFilename(_) => "invalid_filename",
            Self::JobNotFound(_) => "job_not_found",
            Self::ResourceIdMismatch { .. } => "resource_id_mismatch",
            Self::JobNotSigned(_) => "job_not_signed",
            Self::FileNotFound(_) => "file_not_found",
            Self::Storage(_) => "storage_error",
            Self::Metadata(_) => "metadata_error",
            Self::Core(_) => "core_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for file pipeline operations.
pub type FileResult<T> = std::result::Result<T, FileError>;
