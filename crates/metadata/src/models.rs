//! Database models mapping to the metadata schema.

use quizvault_core::{FileArea, JobId, JobStatus, QuizIdentity};
use sqlx::FromRow;
use time::OffsetDateTime;

// =============================================================================
// Managed files
// =============================================================================

/// Managed file record.
///
/// The bytes live in the object store under the blob key of `content_hash`;
/// several records may share one blob.
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: i64,
    pub component: String,
    pub area: String,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
    /// SHA-256 hex of the content.
    pub content_hash: String,
    pub size: i64,
    pub mime_type: Option<String>,
    pub created_at: OffsetDateTime,
}

impl FileRow {
    /// Parsed file area, if the stored tag is a known one.
    pub fn file_area(&self) -> Option<FileArea> {
        FileArea::parse(&self.area).ok()
    }
}

/// A file record to be inserted.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub component: String,
    pub area: FileArea,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub content_hash: String,
    pub size: i64,
    pub mime_type: Option<String>,
    pub created_at: OffsetDateTime,
}

/// New location of a record being moved between areas.
///
/// Content fields are carried over from the source row.
#[derive(Debug, Clone)]
pub struct FileDestination {
    pub component: String,
    pub area: FileArea,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub created_at: OffsetDateTime,
}

/// Selects the records of one component/area.
#[derive(Debug, Clone)]
pub struct AreaFilter {
    pub component: String,
    pub area: FileArea,
    /// Restrict to one item id.
    pub item_id: Option<i64>,
    /// Restrict to one exact file path.
    pub file_path: Option<String>,
}

// =============================================================================
// Archive jobs
// =============================================================================

/// Archive job ledger entry.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub course_id: i64,
    pub cm_id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl JobRow {
    /// The identity triple recorded for this job.
    ///
    /// Returns `None` if a stored component is negative.
    pub fn identity(&self) -> Option<QuizIdentity> {
        Some(QuizIdentity::new(
            u64::try_from(self.course_id).ok()?,
            u64::try_from(self.cm_id).ok()?,
            u64::try_from(self.quiz_id).ok()?,
        ))
    }

    /// Parsed status; unrecognized values read as `Unknown`.
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status).unwrap_or(JobStatus::Unknown)
    }
}

/// A job to be inserted.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub identity: QuizIdentity,
    pub user_id: i64,
    pub status: JobStatus,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// TSP records
// =============================================================================

/// Time-Stamp Protocol record attached to a job.
#[derive(Debug, Clone, FromRow)]
pub struct TspRow {
    pub id: i64,
    pub job_id: i64,
    pub time_created: OffsetDateTime,
    pub server: String,
    pub timestamp_query: Vec<u8>,
    pub timestamp_reply: Vec<u8>,
}

/// A TSP record to be inserted.
#[derive(Debug, Clone)]
pub struct NewTspRecord {
    pub job_id: JobId,
    pub time_created: OffsetDateTime,
    pub server: String,
    pub timestamp_query: Vec<u8>,
    pub timestamp_reply: Vec<u8>,
}
