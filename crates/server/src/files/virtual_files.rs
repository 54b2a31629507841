//! Virtual files synthesized from ledger data.
//!
//! A virtual file path embeds the identity of the quiz and job it belongs to.
//! None of it is trusted: the job ledger's own record must agree with every
//! identity segment before any content is returned, and no storage location
//! is ever derived from the raw path.

use super::error::{FileError, FileResult};
use crate::metrics;
use async_trait::async_trait;
use bytes::Bytes;
use quizvault_core::{JobId, JobStatus, QuizIdentity, TspPart, VirtualArea};
use quizvault_metadata::MetadataStore;
use quizvault_storage::ByteStream;
use std::sync::Arc;

/// Job ledger entry as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: JobId,
    pub identity: QuizIdentity,
    pub status: JobStatus,
}

/// Time-Stamp Protocol payloads of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TspData {
    pub query: Bytes,
    pub reply: Bytes,
}

/// Read-only job lookup.
#[async_trait]
pub trait JobLedger: Send + Sync {
    async fn find_job(&self, id: JobId) -> FileResult<Option<JobRecord>>;
}

/// Read-only TSP record lookup.
#[async_trait]
pub trait TspLedger: Send + Sync {
    async fn find_by_job(&self, job_id: JobId) -> FileResult<Option<TspData>>;
}

/// Ledger adapter over the metadata store.
pub struct MetadataLedger {
    metadata: Arc<dyn MetadataStore>,
}

impl MetadataLedger {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl JobLedger for MetadataLedger {
    async fn find_job(&self, id: JobId) -> FileResult<Option<JobRecord>> {
        let Some(row) = self.metadata.get_job(id).await? else {
            return Ok(None);
        };
        let identity = row
            .identity()
            .ok_or_else(|| FileError::Internal(format!("job {id} has a corrupt identity")))?;
        Ok(Some(JobRecord {
            id,
            identity,
            status: row.job_status(),
        }))
    }
}

#[async_trait]
impl TspLedger for MetadataLedger {
    async fn find_by_job(&self, job_id: JobId) -> FileResult<Option<TspData>> {
        Ok(self
            .metadata
            .find_tsp_by_job(job_id)
            .await?
            .map(|row| TspData {
                query: Bytes::from(row.timestamp_query),
                reply: Bytes::from(row.timestamp_reply),
            }))
    }
}

/// Content of a resolved virtual file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub content: Bytes,
}

impl VirtualFile {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn into_stream(self) -> ByteStream {
        Box::pin(futures::stream::once(async move { Ok(self.content) }))
    }
}

/// Parsed `/<course>/<module>/<quiz>/<job>/<filename>` request.
#[derive(Debug, PartialEq, Eq)]
struct TspRequest {
    identity: QuizIdentity,
    job_id: JobId,
    part: TspPart,
}

/// Resolves virtual file requests against the job and TSP ledgers.
pub struct VirtualFileResolver {
    jobs: Arc<dyn JobLedger>,
    tsp: Arc<dyn TspLedger>,
}

impl VirtualFileResolver {
    pub fn new(jobs: Arc<dyn JobLedger>, tsp: Arc<dyn TspLedger>) -> Self {
        Self { jobs, tsp }
    }

    /// Resolver backed by the metadata store for both ledgers.
    pub fn from_metadata(metadata: Arc<dyn MetadataStore>) -> Self {
        let ledger = Arc::new(MetadataLedger::new(metadata));
        Self::new(ledger.clone(), ledger)
    }

    /// Resolve `path` within the virtual `area`.
    ///
    /// Every syntactic check runs before the first ledger lookup.
    pub async fn resolve(&self, area: &str, path: &str) -> FileResult<VirtualFile> {
        let result = self.resolve_area(area, path).await;
        match &result {
            Ok(_) => metrics::VIRTUAL_FILES_SERVED.inc(),
            Err(e) => metrics::record_virtual_file_rejection(e.code()),
        }
        result
    }

    async fn resolve_area(&self, area: &str, path: &str) -> FileResult<VirtualFile> {
        let area =
            VirtualArea::parse(area).ok_or_else(|| FileError::InvalidArea(area.to_string()))?;

        match area {
            VirtualArea::TspData => {
                let request = parse_tsp_path(path)?;
                self.resolve_tsp(request).await
            }
        }
    }

    async fn resolve_tsp(&self, request: TspRequest) -> FileResult<VirtualFile> {
        let job = self
            .jobs
            .find_job(request.job_id)
            .await?
            .ok_or(FileError::JobNotFound(request.job_id))?;

        if let Err(field) = check_identity(&job.identity, &request.identity) {
            tracing::warn!(
                job_id = %request.job_id,
                field,
                "Virtual file request does not match job identity"
            );
            return Err(FileError::ResourceIdMismatch { field });
        }

        let tsp = self
            .tsp
            .find_by_job(request.job_id)
            .await?
            .ok_or(FileError::JobNotSigned(request.job_id))?;

        let content = match request.part {
            TspPart::Query => tsp.query,
            TspPart::Reply => tsp.reply,
        };

        Ok(VirtualFile {
            filename: request.part.filename(),
            mime_type: request.part.mime_type(),
            content,
        })
    }
}

/// First identity field where the ledger and the request disagree.
fn check_identity(
    recorded: &QuizIdentity,
    requested: &QuizIdentity,
) -> Result<(), &'static str> {
    if recorded.course_id != requested.course_id {
        return Err("course");
    }
    if recorded.cm_id != requested.cm_id {
        return Err("module");
    }
    if recorded.quiz_id != requested.quiz_id {
        return Err("quiz");
    }
    Ok(())
}

fn parse_tsp_path(path: &str) -> FileResult<TspRequest> {
    if path.contains(['\\', '\0']) {
        return Err(FileError::InvalidPath(
            "path contains an illegal character".to_string(),
        ));
    }
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| FileError::InvalidPath("path must start with '/'".to_string()))?;

    let segments: Vec<&str> = rest.split('/').collect();
    let [course, cm, quiz, job, filename] = segments.as_slice() else {
        return Err(FileError::InvalidPath(
            "expected /<course>/<module>/<quiz>/<job>/<filename>".to_string(),
        ));
    };
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(FileError::InvalidPath(
            "path contains an empty or relative segment".to_string(),
        ));
    }

    let identity = QuizIdentity::from_segments(course, cm, quiz)
        .map_err(|e| FileError::InvalidPath(e.to_string()))?;
    let job_id = JobId::parse(job).map_err(|e| FileError::InvalidJobId(e.to_string()))?;
    let part = TspPart::from_filename(filename)
        .ok_or_else(|| FileError::InvalidFilename(filename.to_string()))?;

    Ok(TspRequest {
        identity,
        job_id,
        part,
    })
}
