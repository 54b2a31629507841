//! Managed file layer.
//!
//! Every file is a metadata record addressed by
//! `(component, area, item_id, file_path, file_name)` pointing at a
//! content-addressed blob. Records sharing content share one blob; the blob is
//! removed when its last record goes.

use super::error::{FileError, FileResult};
use bytes::Bytes;
use futures::StreamExt;
use quizvault_core::{
    ARCHIVER_COMPONENT, Clock, ContentHash, ContentHasher, DRAFT_COMPONENT, FileArea, JobId,
    QuizIdentity, temp_file_path,
};
use quizvault_metadata::MetadataError;
use quizvault_metadata::MetadataStore;
use quizvault_metadata::models::{AreaFilter, FileDestination, FileRow, NewFile};
use quizvault_storage::{ByteStream, ObjectStore, StorageError};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Where a managed file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub component: String,
    pub area: FileArea,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
}

impl FileLocation {
    /// A file in a caller's draft holding area.
    pub fn draft(item_id: i64, file_name: impl Into<String>) -> Self {
        Self {
            component: DRAFT_COMPONENT.to_string(),
            area: FileArea::Draft,
            item_id,
            file_path: "/".to_string(),
            file_name: file_name.into(),
        }
    }

    /// A permanent artifact of `job_id`, namespaced by the quiz identity.
    pub fn artifact(job_id: JobId, identity: &QuizIdentity, file_name: impl Into<String>) -> Self {
        Self {
            component: ARCHIVER_COMPONENT.to_string(),
            area: FileArea::Artifact,
            item_id: job_id.as_i64(),
            file_path: identity.storage_path(),
            file_name: file_name.into(),
        }
    }

    /// A temporary file that expires at `expiry` (epoch seconds).
    pub fn temp(expiry: i64, file_name: impl Into<String>) -> Self {
        Self {
            component: ARCHIVER_COMPONENT.to_string(),
            area: FileArea::Temp,
            item_id: 0,
            file_path: temp_file_path(expiry),
            file_name: file_name.into(),
        }
    }
}

/// Handle to a managed file.
///
/// Only built from a metadata record. Not `Clone`: operations that consume a
/// file (moving a draft into the artifact store, deleting) take the handle by
/// value.
#[derive(Debug, PartialEq, Eq)]
pub struct StoredFile {
    id: i64,
    component: String,
    area: FileArea,
    item_id: i64,
    file_path: String,
    file_name: String,
    content_hash: String,
    size: u64,
    mime_type: Option<String>,
    created_at: OffsetDateTime,
}

impl StoredFile {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn area(&self) -> FileArea {
        self.area
    }

    pub fn item_id(&self) -> i64 {
        self.item_id
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// SHA-256 hex of the content.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Object store key of the content blob.
    pub fn blob_key(&self) -> FileResult<String> {
        Ok(ContentHash::from_hex(&self.content_hash)?.blob_key())
    }

    /// Whether the file sits at the given component/area/path.
    pub fn is_in(&self, component: &str, area: FileArea, file_path: &str) -> bool {
        self.component == component && self.area == area && self.file_path == file_path
    }
}

impl TryFrom<FileRow> for StoredFile {
    type Error = FileError;

    fn try_from(row: FileRow) -> FileResult<Self> {
        let area = FileArea::parse(&row.area)?;
        let size = u64::try_from(row.size)
            .map_err(|_| FileError::Internal(format!("file {} has negative size", row.id)))?;
        Ok(Self {
            id: row.id,
            component: row.component,
            area,
            item_id: row.item_id,
            file_path: row.file_path,
            file_name: row.file_name,
            content_hash: row.content_hash,
            size,
            mime_type: row.mime_type,
            created_at: row.created_at,
        })
    }
}

/// Managed file storage over an object store and the metadata store.
pub struct FileStorage {
    storage: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    clock: Arc<dyn Clock>,
    // Serializes "write blob + insert record" against "count references + delete blob".
    blob_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            metadata,
            clock,
            blob_lock: Mutex::new(()),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// Store `data` as a new file at `location`.
    ///
    /// Fails with `Metadata(AlreadyExists)` if the location is taken.
    pub async fn create_file(
        &self,
        location: &FileLocation,
        data: Bytes,
        mime_type: Option<&str>,
    ) -> FileResult<StoredFile> {
        let hash = ContentHash::compute(&data);
        let key = hash.blob_key();
        let size = i64::try_from(data.len())
            .map_err(|_| FileError::Internal("file too large".to_string()))?;

        let new_file = NewFile {
            component: location.component.clone(),
            area: location.area,
            item_id: location.item_id,
            file_path: location.file_path.clone(),
            file_name: location.file_name.clone(),
            content_hash: hash.to_hex(),
            size,
            mime_type: mime_type.map(str::to_string),
            created_at: self.clock.now(),
        };

        let _guard = self.blob_lock.lock().await;
        let blob_written = self.storage.put_if_not_exists(&key, data).await?;

        let row = match self.metadata.insert_file(&new_file).await {
            Ok(row) => row,
            Err(e) => {
                if blob_written {
                    self.remove_blob_if_unreferenced(&new_file.content_hash, &key)
                        .await;
                }
                return Err(e.into());
            }
        };

        tracing::debug!(
            file_id = row.id,
            area = %location.area,
            size,
            deduplicated = !blob_written,
            "Stored file"
        );

        row.try_into()
    }

    /// Load a file handle by id.
    pub async fn get_file(&self, id: i64) -> FileResult<StoredFile> {
        self.metadata
            .get_file(id)
            .await?
            .ok_or(FileError::FileNotFound(id))?
            .try_into()
    }

    /// Look up a file by its full location.
    pub async fn find_file(&self, location: &FileLocation) -> FileResult<Option<StoredFile>> {
        self.metadata
            .find_file(
                &location.component,
                location.area.as_str(),
                location.item_id,
                &location.file_path,
                &location.file_name,
            )
            .await?
            .map(StoredFile::try_from)
            .transpose()
    }

    /// List files matching `filter`, newest first.
    pub async fn list_files(&self, filter: &AreaFilter) -> FileResult<Vec<StoredFile>> {
        self.metadata
            .list_files(filter)
            .await?
            .into_iter()
            .map(StoredFile::try_from)
            .collect()
    }

    /// Stream a file's content.
    pub async fn open_stream(&self, file: &StoredFile) -> FileResult<ByteStream> {
        Ok(self.storage.get_stream(&file.blob_key()?).await?)
    }

    /// Read a file's whole content into memory.
    pub async fn read_bytes(&self, file: &StoredFile) -> FileResult<Bytes> {
        Ok(self.storage.get(&file.blob_key()?).await?)
    }

    /// Digest of a file's content under the named algorithm.
    ///
    /// Returns `None` for an unsupported algorithm without reading the content.
    pub async fn content_digest(
        &self,
        file: &StoredFile,
        algorithm: &str,
    ) -> FileResult<Option<String>> {
        let Some(mut hasher) = ContentHasher::for_name(algorithm) else {
            return Ok(None);
        };

        let mut stream = self.open_stream(file).await?;
        while let Some(chunk) = stream.next().await {
            hasher.update(&chunk?);
        }
        Ok(Some(hasher.finalize_hex()))
    }

    /// Move a file to `target` in one metadata transaction.
    ///
    /// The stored record must still sit in the handle's area, otherwise
    /// nothing moves and `PreconditionViolation` is returned. Content and blob
    /// are untouched; the returned handle has a new id.
    pub async fn relocate(&self, file: StoredFile, target: &FileLocation) -> FileResult<StoredFile> {
        let destination = FileDestination {
            component: target.component.clone(),
            area: target.area,
            item_id: target.item_id,
            file_path: target.file_path.clone(),
            file_name: target.file_name.clone(),
            created_at: self.clock.now(),
        };

        let row = self
            .metadata
            .relocate_file(file.id, file.area, &destination)
            .await
            .map_err(|e| match e {
                MetadataError::NotFound(_) => FileError::FileNotFound(file.id),
                MetadataError::WrongArea {
                    expected, actual, ..
                } => FileError::PreconditionViolation { expected, actual },
                other => FileError::Metadata(other),
            })?;
        row.try_into()
    }

    /// Delete a file. Returns whether a record was removed.
    ///
    /// The blob goes with the last record that references it.
    pub async fn delete_file(&self, file: &StoredFile) -> FileResult<bool> {
        let key = file.blob_key()?;

        let _guard = self.blob_lock.lock().await;
        if !self.metadata.delete_file(file.id).await? {
            return Ok(false);
        }
        self.remove_blob_if_unreferenced(&file.content_hash, &key)
            .await;
        Ok(true)
    }

    /// Caller must hold `blob_lock`. Failures leave an orphaned blob and are only logged.
    async fn remove_blob_if_unreferenced(&self, content_hash: &str, key: &str) {
        match self.metadata.count_files_with_hash(content_hash).await {
            Ok(0) => match self.storage.delete(key).await {
                Ok(()) | Err(StorageError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(blob_key = %key, error = %e, "Failed to delete unreferenced blob");
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(blob_key = %key, error = %e, "Failed to count blob references");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::ArtifactStore;
    use quizvault_core::ManualClock;
    use quizvault_metadata::SqliteStore;
    use quizvault_storage::FilesystemBackend;
    use tempfile::TempDir;

    async fn file_storage() -> (TempDir, Arc<dyn ObjectStore>, FileStorage) {
        let temp = tempfile::tempdir().unwrap();
        let storage: Arc<dyn ObjectStore> =
            Arc::new(FilesystemBackend::new(temp.path().join("blobs")).await.unwrap());
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp.path().join("metadata.db"), None)
                .await
                .unwrap(),
        );
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(1_700_000_000));
        let files = FileStorage::new(storage.clone(), metadata, clock);
        (temp, storage, files)
    }

    #[tokio::test]
    async fn test_create_and_read_file() {
        let (_temp, storage, files) = file_storage().await;
        let file = files
            .create_file(
                &FileLocation::draft(3, "quiz.tar.gz"),
                Bytes::from_static(b"archive bytes"),
                Some("application/gzip"),
            )
            .await
            .unwrap();

        assert_eq!(file.area, FileArea::Draft);
        assert_eq!(file.component, DRAFT_COMPONENT);
        assert_eq!(file.size, 13);
        assert_eq!(file.created_at.unix_timestamp(), 1_700_000_000);
        assert!(storage.exists(&file.blob_key().unwrap()).await.unwrap());
        assert_eq!(
            files.read_bytes(&file).await.unwrap(),
            Bytes::from_static(b"archive bytes")
        );

        let found = files
            .find_file(&FileLocation::draft(3, "quiz.tar.gz"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, file.id);
    }

    #[tokio::test]
    async fn test_content_digest_algorithms() {
        let (_temp, _storage, files) = file_storage().await;
        let file = files
            .create_file(&FileLocation::draft(1, "a"), Bytes::from_static(b"abc"), None)
            .await
            .unwrap();

        let sha256 = files.content_digest(&file, "sha256").await.unwrap().unwrap();
        assert_eq!(sha256, file.content_hash);
        assert_eq!(
            sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let sha512 = files.content_digest(&file, "SHA512").await.unwrap().unwrap();
        assert_eq!(sha512.len(), 128);

        assert!(files.content_digest(&file, "bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shared_blob_survives_until_last_reference() {
        let (_temp, storage, files) = file_storage().await;
        let data = Bytes::from_static(b"same content");
        let first = files
            .create_file(&FileLocation::draft(1, "a"), data.clone(), None)
            .await
            .unwrap();
        let second = files
            .create_file(&FileLocation::draft(2, "b"), data, None)
            .await
            .unwrap();
        let key = first.blob_key().unwrap();

        assert!(files.delete_file(&first).await.unwrap());
        assert!(storage.exists(&key).await.unwrap());

        assert!(files.delete_file(&second).await.unwrap());
        assert!(!storage.exists(&key).await.unwrap());

        assert!(!files.delete_file(&second).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_location_leaves_no_orphan_blob() {
        let (_temp, storage, files) = file_storage().await;
        files
            .create_file(&FileLocation::draft(1, "a"), Bytes::from_static(b"one"), None)
            .await
            .unwrap();

        let err = files
            .create_file(&FileLocation::draft(1, "a"), Bytes::from_static(b"two"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FileError::Metadata(MetadataError::AlreadyExists(_))
        ));

        let orphan = ContentHash::compute(b"two").blob_key();
        assert!(!storage.exists(&orphan).await.unwrap());
    }

    #[tokio::test]
    async fn test_relocate_moves_without_copying() {
        let (_temp, _storage, files) = file_storage().await;
        let draft = files
            .create_file(&FileLocation::draft(1, "a.tar.gz"), Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        let draft_id = draft.id;
        let hash = draft.content_hash.clone();

        let target = FileLocation::temp(0, "a.tar.gz");
        let moved = files.relocate(draft, &target).await.unwrap();

        assert_eq!(moved.area(), FileArea::Temp);
        assert_eq!(moved.file_path(), "/0/");
        assert_eq!(moved.content_hash(), hash);
        assert!(matches!(
            files.get_file(draft_id).await,
            Err(FileError::FileNotFound(id)) if id == draft_id
        ));
    }

    #[tokio::test]
    async fn test_forged_draft_handle_cannot_move_artifact() {
        let (_temp, _storage, files) = file_storage().await;
        let files = Arc::new(files);
        let location =
            FileLocation::artifact(JobId::new(1).unwrap(), &QuizIdentity::new(1, 1, 1), "a.tar.gz");
        let victim = files
            .create_file(
                &location,
                Bytes::from_static(b"victim archive"),
                Some("application/gzip"),
            )
            .await
            .unwrap();

        // Claims the artifact's id is a draft, with made-up content
        let forged = StoredFile {
            id: victim.id,
            component: DRAFT_COMPONENT.to_string(),
            area: FileArea::Draft,
            item_id: 1,
            file_path: "/".to_string(),
            file_name: "a.tar.gz".to_string(),
            content_hash: "0".repeat(64),
            size: 1,
            mime_type: None,
            created_at: victim.created_at,
        };

        let foreign = ArtifactStore::new(files.clone(), QuizIdentity::new(9, 9, 9));
        let err = foreign
            .store_uploaded_artifact(forged, JobId::new(9).unwrap())
            .await
            .unwrap_err();
        match err {
            FileError::PreconditionViolation { expected, actual } => {
                assert_eq!(expected, "draft");
                assert_eq!(actual, "artifact");
            }
            other => panic!("expected PreconditionViolation, got {other:?}"),
        }

        assert_eq!(files.get_file(victim.id).await.unwrap(), victim);
        assert!(foreign.get_stored_artifacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relocate_takes_content_fields_from_record() {
        let (_temp, _storage, files) = file_storage().await;
        let draft = files
            .create_file(
                &FileLocation::draft(1, "a.tar.gz"),
                Bytes::from_static(b"draft bytes"),
                Some("application/gzip"),
            )
            .await
            .unwrap();
        let hash = draft.content_hash.clone();

        let tampered = StoredFile {
            content_hash: "0".repeat(64),
            size: 999_999,
            mime_type: Some("text/html".to_string()),
            ..draft
        };
        let moved = files
            .relocate(tampered, &FileLocation::temp(0, "a.tar.gz"))
            .await
            .unwrap();

        assert_eq!(moved.content_hash(), hash);
        assert_eq!(moved.size(), 11);
        assert_eq!(moved.mime_type(), Some("application/gzip"));
        assert_eq!(
            files.read_bytes(&moved).await.unwrap(),
            Bytes::from_static(b"draft bytes")
        );
    }
}
