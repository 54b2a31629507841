//! Permanent archive artifacts of one quiz.

use super::error::{FileError, FileResult};
use super::storage::{FileLocation, FileStorage, StoredFile};
use crate::metrics;
use quizvault_core::{ARCHIVER_COMPONENT, FileArea, JobId, QuizIdentity};
use quizvault_metadata::models::AreaFilter;
use std::sync::Arc;

/// Artifact store bound to one quiz identity.
///
/// All artifacts it creates, lists and deletes live under the storage path of
/// that identity; file locations supplied by callers are never trusted.
pub struct ArtifactStore {
    files: Arc<FileStorage>,
    identity: QuizIdentity,
}

impl ArtifactStore {
    pub fn new(files: Arc<FileStorage>, identity: QuizIdentity) -> Self {
        Self { files, identity }
    }

    pub fn identity(&self) -> QuizIdentity {
        self.identity
    }

    /// Move an uploaded draft into permanent storage as an artifact of `job_id`.
    ///
    /// The draft handle is consumed: on success the draft no longer exists.
    /// The area is checked again against the stored record when the move
    /// commits. Content is not rewritten, so the digest is unchanged.
    pub async fn store_uploaded_artifact(
        &self,
        draft: StoredFile,
        job_id: JobId,
    ) -> FileResult<StoredFile> {
        if draft.area() != FileArea::Draft {
            return Err(FileError::PreconditionViolation {
                expected: FileArea::Draft.as_str(),
                actual: draft.area().as_str().to_string(),
            });
        }

        let draft_id = draft.id();
        let target = FileLocation::artifact(job_id, &self.identity, draft.file_name().to_string());
        let artifact = self.files.relocate(draft, &target).await?;
        metrics::ARTIFACTS_STORED.inc();

        tracing::info!(
            job_id = %job_id,
            identity = %self.identity,
            draft_id,
            file_id = artifact.id(),
            size = artifact.size(),
            "Stored uploaded artifact"
        );

        Ok(artifact)
    }

    /// All artifacts of this identity, newest first.
    pub async fn get_stored_artifacts(&self) -> FileResult<Vec<StoredFile>> {
        self.files.list_files(&self.filter()).await
    }

    /// Load one artifact by file id.
    ///
    /// Files outside this identity's namespace read as not found.
    pub async fn get_artifact(&self, file_id: i64) -> FileResult<StoredFile> {
        let file = self.files.get_file(file_id).await?;
        if !self.owns(&file) {
            return Err(FileError::FileNotFound(file_id));
        }
        Ok(file)
    }

    /// Delete one artifact of this identity.
    pub async fn delete_artifact(&self, artifact: StoredFile) -> FileResult<()> {
        if !self.owns(&artifact) {
            return Err(FileError::FileNotFound(artifact.id()));
        }
        if !self.files.delete_file(&artifact).await? {
            return Err(FileError::FileNotFound(artifact.id()));
        }
        metrics::ARTIFACTS_DELETED.inc();
        tracing::info!(identity = %self.identity, file_id = artifact.id(), "Deleted artifact");
        Ok(())
    }

    /// Delete every artifact of this identity. Returns how many were removed.
    pub async fn delete_all(&self) -> FileResult<usize> {
        let mut deleted = 0;
        for artifact in self.get_stored_artifacts().await? {
            if self.files.delete_file(&artifact).await? {
                metrics::ARTIFACTS_DELETED.inc();
                deleted += 1;
            }
        }
        tracing::info!(identity = %self.identity, deleted, "Deleted all artifacts");
        Ok(deleted)
    }

    fn owns(&self, file: &StoredFile) -> bool {
        file.is_in(
            ARCHIVER_COMPONENT,
            FileArea::Artifact,
            &self.identity.storage_path(),
        )
    }

    fn filter(&self) -> AreaFilter {
        AreaFilter {
            component: ARCHIVER_COMPONENT.to_string(),
            area: FileArea::Artifact,
            item_id: None,
            file_path: Some(self.identity.storage_path()),
        }
    }
}
