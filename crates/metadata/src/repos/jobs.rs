//! Archive job ledger repository.

use crate::error::MetadataResult;
use crate::models::{JobRow, NewJob};
use async_trait::async_trait;
use quizvault_core::JobId;

/// Repository for archive job ledger entries.
#[async_trait]
pub trait JobRepo: Send + Sync {
    /// Create a job and return it with its assigned id.
    async fn create_job(&self, job: &NewJob) -> MetadataResult<JobRow>;

    /// Get a job by id.
    async fn get_job(&self, id: JobId) -> MetadataResult<Option<JobRow>>;
}
