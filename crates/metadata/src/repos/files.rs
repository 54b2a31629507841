//! Managed file repository.

use crate::error::MetadataResult;
use crate::models::{AreaFilter, FileDestination, FileRow, NewFile};
use quizvault_core::FileArea;
use async_trait::async_trait;

/// Repository for managed file records.
#[async_trait]
pub trait FileRepo: Send + Sync {
    /// Insert a file record and return it with its assigned id.
    ///
    /// Fails with `AlreadyExists` if the location is taken.
    async fn insert_file(&self, file: &NewFile) -> MetadataResult<FileRow>;

    /// Get a file record by id.
    async fn get_file(&self, id: i64) -> MetadataResult<Option<FileRow>>;

    /// Look up a file record by its full location.
    async fn find_file(
        &self,
        component: &str,
        area: &str,
        item_id: i64,
        file_path: &str,
        file_name: &str,
    ) -> MetadataResult<Option<FileRow>>;

    /// List the records matching `filter`, newest first.
    async fn list_files(&self, filter: &AreaFilter) -> MetadataResult<Vec<FileRow>>;

    /// List records of a component/area in ascending id order.
    ///
    /// Only ids in `(after_id, max_id]` are returned, at most `limit` of them.
    async fn list_files_in_id_range(
        &self,
        component: &str,
        area: &str,
        after_id: i64,
        max_id: i64,
        limit: u32,
    ) -> MetadataResult<Vec<FileRow>>;

    /// Move record `from_id` out of `from_area` to `target` in one transaction.
    ///
    /// Content hash, size and MIME type are taken from the stored row. Nothing
    /// is written when the record is gone (`NotFound`) or sits in another
    /// area (`WrongArea`).
    async fn relocate_file(
        &self,
        from_id: i64,
        from_area: FileArea,
        target: &FileDestination,
    ) -> MetadataResult<FileRow>;

    /// Delete a file record. Returns whether a record was removed.
    async fn delete_file(&self, id: i64) -> MetadataResult<bool>;

    /// Number of records referencing a content hash.
    async fn count_files_with_hash(&self, content_hash: &str) -> MetadataResult<i64>;

    /// Highest file id assigned so far (0 when empty).
    async fn max_file_id(&self) -> MetadataResult<i64>;
}
