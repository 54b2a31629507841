//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid job id: {0}")]
    InvalidJobId(String),

    #[error("invalid job status: {0}")]
    InvalidJobStatus(String),

    #[error("invalid file area: {0}")]
    InvalidFileArea(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid expiry path: {0}")]
    InvalidExpiry(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
