//! TSP record repository.

use crate::error::MetadataResult;
use crate::models::{NewTspRecord, TspRow};
use async_trait::async_trait;
use quizvault_core::JobId;

/// Repository for Time-Stamp Protocol records.
#[async_trait]
pub trait TspRepo: Send + Sync {
    /// Store a TSP record for a job.
    async fn create_tsp_record(&self, record: &NewTspRecord) -> MetadataResult<TspRow>;

    /// Find the TSP record of a job.
    ///
    /// When a job has several records the most recent one wins
    /// (`time_created`, then `id`).
    async fn find_tsp_by_job(&self, job_id: JobId) -> MetadataResult<Option<TspRow>>;
}
