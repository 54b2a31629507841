//! Extraction of one attempt's data from a stored archive artifact.

use super::error::{FileError, FileResult};
use super::storage::{FileLocation, FileStorage, StoredFile};
use crate::metrics;
use bytes::Bytes;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use futures::TryStreamExt;
use quizvault_core::JobId;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio_util::io::{StreamReader, SyncIoBridge};
use uuid::Uuid;

/// Top-level archive directory holding per-attempt data.
const ATTEMPTS_DIR: &str = "attempts";

const TEMP_MIME_TYPE: &str = "application/gzip";

/// Pulls a single attempt out of an archive artifact into a temp file.
pub struct AttemptExtractor {
    files: Arc<FileStorage>,
    retention_secs: i64,
}

impl AttemptExtractor {
    pub fn new(files: Arc<FileStorage>, retention_secs: i64) -> Self {
        Self {
            files,
            retention_secs,
        }
    }

    /// Extract the data of `attempt_id` from `artifact` into a new temp file.
    ///
    /// The artifact is read in one forward pass over the decompressed tar
    /// stream; it is never fully buffered or written to local disk.
    pub async fn extract_attempt_data(
        &self,
        artifact: &StoredFile,
        job_id: JobId,
        attempt_id: u64,
    ) -> FileResult<StoredFile> {
        let timer = metrics::ATTEMPT_EXTRACTION_DURATION.start_timer();
        let result = self.extract(artifact, job_id, attempt_id).await;
        timer.observe_duration();

        match &result {
            Ok(_) => metrics::record_extraction("success"),
            Err(e) => metrics::record_extraction(e.code()),
        }
        result
    }

    async fn extract(
        &self,
        artifact: &StoredFile,
        job_id: JobId,
        attempt_id: u64,
    ) -> FileResult<StoredFile> {
        let stream = self
            .files
            .open_stream(artifact)
            .await?
            .map_err(std::io::Error::other);
        let reader = SyncIoBridge::new(StreamReader::new(stream));

        let packed = tokio::task::spawn_blocking(move || repackage_attempt(reader, attempt_id))
            .await
            .map_err(|e| FileError::Internal(format!("extraction task failed: {e}")))??;

        let expiry = self
            .files
            .clock()
            .unix_timestamp()
            .saturating_add(self.retention_secs);
        let file_name = format!(
            "attempt_data_{job_id}_{attempt_id}_{}.tar.gz",
            Uuid::new_v4().simple()
        );

        let temp = self
            .files
            .create_file(
                &FileLocation::temp(expiry, file_name),
                Bytes::from(packed),
                Some(TEMP_MIME_TYPE),
            )
            .await?;

        tracing::info!(
            job_id = %job_id,
            attempt_id,
            artifact_id = artifact.id(),
            file_id = temp.id(),
            size = temp.size(),
            expiry,
            "Extracted attempt data"
        );

        Ok(temp)
    }
}

fn archive_error(err: std::io::Error) -> FileError {
    FileError::ArchiveProcessing(err.to_string())
}

/// Copy every entry of the matching attempt directory into a new tar.gz.
///
/// Paths are kept relative to `attempts/`. Only regular files and
/// directories are carried over. A stream holding no tar entries at all is
/// not an archive.
fn repackage_attempt<R: Read>(reader: R, attempt_id: u64) -> FileResult<Vec<u8>> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let mut seen = 0usize;
    let mut copied = 0usize;

    for entry in archive.entries().map_err(archive_error)? {
        let mut entry = entry.map_err(archive_error)?;
        seen += 1;
        let path = entry.path().map_err(archive_error)?.into_owned();

        let Some(relative) = attempt_entry_path(&path, attempt_id) else {
            continue;
        };
        let entry_type = entry.header().entry_type();
        if !entry_type.is_file() && !entry_type.is_dir() {
            continue;
        }

        let mut header = entry.header().clone();
        builder
            .append_data(&mut header, &relative, &mut entry)
            .map_err(archive_error)?;
        copied += 1;
    }

    if seen == 0 {
        return Err(FileError::ArchiveProcessing(
            "archive contains no entries".to_string(),
        ));
    }
    if copied == 0 {
        return Err(FileError::AttemptNotFound { attempt_id });
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| FileError::Internal(format!("failed to finish attempt archive: {e}")))?;
    encoder
        .finish()
        .map_err(|e| FileError::Internal(format!("failed to compress attempt archive: {e}")))
}

/// Path of an archive entry relative to `attempts/`, if it belongs to `attempt_id`.
fn attempt_entry_path(path: &Path, attempt_id: u64) -> Option<PathBuf> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }

    match parts.as_slice() {
        [ATTEMPTS_DIR, child, ..] if attempt_number(child) == Some(attempt_id) => {
            Some(parts[1..].iter().collect())
        }
        _ => None,
    }
}

/// Attempt number encoded in an attempt directory or file name.
///
/// Any extension is dropped and the trailing digit run after the last `-` or
/// `_` is read, e.g. `attempt-2024-01-13775.tar` gives 13775.
fn attempt_number(name: &str) -> Option<u64> {
    let stem = name.split('.').next()?;
    let digits = stem.rsplit(['-', '_']).next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
