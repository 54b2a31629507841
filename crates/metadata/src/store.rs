//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{FileRepo, JobRepo, TspRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: FileRepo + JobRepo + TspRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) a SQLite store and run migrations.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();
        let query_timeout_secs = query_timeout_secs.unwrap_or(600);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // A single connection serializes writers; SQLite allows only one anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(query_timeout_secs))
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(
            path = %path.display(),
            query_timeout_secs,
            "SQLite metadata store opened"
        );

        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn to_db_id(field: &str, value: u64) -> MetadataResult<i64> {
    i64::try_from(value)
        .map_err(|_| MetadataError::Internal(format!("{field} id {value} exceeds database range")))
}

mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use quizvault_core::{FileArea, JobId};

    const INSERT_FILE_SQL: &str = r#"
        INSERT INTO files (component, area, item_id, file_path, file_name,
                           content_hash, size, mime_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;

    fn bind_new_file<'q>(
        query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
        file: &'q NewFile,
    ) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        query
            .bind(&file.component)
            .bind(file.area.as_str())
            .bind(file.item_id)
            .bind(&file.file_path)
            .bind(&file.file_name)
            .bind(&file.content_hash)
            .bind(file.size)
            .bind(&file.mime_type)
            .bind(file.created_at)
    }

    fn describe_location(file: &NewFile) -> String {
        format!(
            "file {}/{}/{}{}{}",
            file.component, file.area, file.item_id, file.file_path, file.file_name
        )
    }

    #[async_trait]
    impl FileRepo for SqliteStore {
        async fn insert_file(&self, file: &NewFile) -> MetadataResult<FileRow> {
            let result = bind_new_file(sqlx::query(INSERT_FILE_SQL), file)
                .execute(&self.pool)
                .await
                .map_err(|e| MetadataError::from_insert(e, || describe_location(file)))?;

            let row = sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_file(&self, id: i64) -> MetadataResult<Option<FileRow>> {
            let row = sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn find_file(
            &self,
            component: &str,
            area: &str,
            item_id: i64,
            file_path: &str,
            file_name: &str,
        ) -> MetadataResult<Option<FileRow>> {
            let row = sqlx::query_as::<_, FileRow>(
                r#"
                SELECT * FROM files
                WHERE component = ? AND area = ? AND item_id = ? AND file_path = ? AND file_name = ?
                "#,
            )
            .bind(component)
            .bind(area)
            .bind(item_id)
            .bind(file_path)
            .bind(file_name)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_files(&self, filter: &AreaFilter) -> MetadataResult<Vec<FileRow>> {
            let rows = sqlx::query_as::<_, FileRow>(
                r#"
                SELECT * FROM files
                WHERE component = ?
                  AND area = ?
                  AND (? IS NULL OR item_id = ?)
                  AND (? IS NULL OR file_path = ?)
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(&filter.component)
            .bind(filter.area.as_str())
            .bind(filter.item_id)
            .bind(filter.item_id)
            .bind(&filter.file_path)
            .bind(&filter.file_path)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_files_in_id_range(
            &self,
            component: &str,
            area: &str,
            after_id: i64,
            max_id: i64,
            limit: u32,
        ) -> MetadataResult<Vec<FileRow>> {
            let rows = sqlx::query_as::<_, FileRow>(
                r#"
                SELECT * FROM files
                WHERE component = ? AND area = ? AND id > ? AND id <= ?
                ORDER BY id ASC
                LIMIT ?
                "#,
            )
            .bind(component)
            .bind(area)
            .bind(after_id)
            .bind(max_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn relocate_file(
            &self,
            from_id: i64,
            from_area: FileArea,
            target: &FileDestination,
        ) -> MetadataResult<FileRow> {
            let mut tx = self.pool.begin().await?;

            let source: Option<(String, i64, Option<String>)> = sqlx::query_as(
                "DELETE FROM files WHERE id = ? AND area = ? RETURNING content_hash, size, mime_type",
            )
            .bind(from_id)
            .bind(from_area.as_str())
            .fetch_optional(&mut *tx)
            .await?;

            let Some((content_hash, size, mime_type)) = source else {
                let actual: Option<String> =
                    sqlx::query_scalar("SELECT area FROM files WHERE id = ?")
                        .bind(from_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                tx.rollback().await?;
                return Err(match actual {
                    Some(actual) => MetadataError::WrongArea {
                        id: from_id,
                        expected: from_area.as_str(),
                        actual,
                    },
                    None => MetadataError::NotFound(format!("file {from_id}")),
                });
            };

            let new_file = NewFile {
                component: target.component.clone(),
                area: target.area,
                item_id: target.item_id,
                file_path: target.file_path.clone(),
                file_name: target.file_name.clone(),
                content_hash,
                size,
                mime_type,
                created_at: target.created_at,
            };

            // An insert failure drops `tx`, which rolls the delete back
            let result = bind_new_file(sqlx::query(INSERT_FILE_SQL), &new_file)
                .execute(&mut *tx)
                .await
                .map_err(|e| MetadataError::from_insert(e, || describe_location(&new_file)))?;

            let row = sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(row)
        }

        async fn delete_file(&self, id: i64) -> MetadataResult<bool> {
            let result = sqlx::query("DELETE FROM files WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn count_files_with_hash(&self, content_hash: &str) -> MetadataResult<i64> {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE content_hash = ?")
                    .bind(content_hash)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count)
        }

        async fn max_file_id(&self) -> MetadataResult<i64> {
            let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM files")
                .fetch_one(&self.pool)
                .await?;
            Ok(max)
        }
    }

    #[async_trait]
    impl JobRepo for SqliteStore {
        async fn create_job(&self, job: &NewJob) -> MetadataResult<JobRow> {
            let result = sqlx::query(
                r#"
                INSERT INTO archive_jobs (course_id, cm_id, quiz_id, user_id, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(to_db_id("course", job.identity.course_id)?)
            .bind(to_db_id("module", job.identity.cm_id)?)
            .bind(to_db_id("quiz", job.identity.quiz_id)?)
            .bind(job.user_id)
            .bind(job.status.as_str())
            .bind(job.created_at)
            .bind(job.created_at)
            .execute(&self.pool)
            .await?;

            let row = sqlx::query_as::<_, JobRow>("SELECT * FROM archive_jobs WHERE id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_job(&self, id: JobId) -> MetadataResult<Option<JobRow>> {
            let row = sqlx::query_as::<_, JobRow>("SELECT * FROM archive_jobs WHERE id = ?")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl TspRepo for SqliteStore {
        async fn create_tsp_record(&self, record: &NewTspRecord) -> MetadataResult<TspRow> {
            let result = sqlx::query(
                r#"
                INSERT INTO tsp_records (job_id, time_created, server, timestamp_query, timestamp_reply)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.job_id.as_i64())
            .bind(record.time_created)
            .bind(&record.server)
            .bind(&record.timestamp_query)
            .bind(&record.timestamp_reply)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    MetadataError::NotFound(format!("job {}", record.job_id))
                }
                _ => MetadataError::Database(e),
            })?;

            let row = sqlx::query_as::<_, TspRow>("SELECT * FROM tsp_records WHERE id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(&self.pool)
                .await?;
            Ok(row)
        }

        async fn find_tsp_by_job(&self, job_id: JobId) -> MetadataResult<Option<TspRow>> {
            let row = sqlx::query_as::<_, TspRow>(
                r#"
                SELECT * FROM tsp_records
                WHERE job_id = ?
                ORDER BY time_created DESC, id DESC
                LIMIT 1
                "#,
            )
            .bind(job_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }
    }
}

const SCHEMA_SQL: &str = r#"
-- Managed files. Bytes live in the object store keyed by content_hash.
-- AUTOINCREMENT keeps ids monotonic so sweeps can use an id watermark.
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    component TEXT NOT NULL,
    area TEXT NOT NULL,
    item_id INTEGER NOT NULL,
    file_path TEXT NOT NULL,
    file_name TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    size INTEGER NOT NULL,
    mime_type TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (component, area, item_id, file_path, file_name)
);
CREATE INDEX IF NOT EXISTS idx_files_content_hash ON files(content_hash);
CREATE INDEX IF NOT EXISTS idx_files_area_id ON files(component, area, id);
CREATE INDEX IF NOT EXISTS idx_files_area_path ON files(component, area, file_path);

-- Archive job ledger
CREATE TABLE IF NOT EXISTS archive_jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id INTEGER NOT NULL,
    cm_id INTEGER NOT NULL,
    quiz_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'unknown',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_archive_jobs_quiz ON archive_jobs(course_id, cm_id, quiz_id);

-- Time-Stamp Protocol records
CREATE TABLE IF NOT EXISTS tsp_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id INTEGER NOT NULL REFERENCES archive_jobs(id) ON DELETE CASCADE,
    time_created TEXT NOT NULL,
    server TEXT NOT NULL,
    timestamp_query BLOB NOT NULL,
    timestamp_reply BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tsp_records_job ON tsp_records(job_id, time_created);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AreaFilter, FileDestination, NewFile, NewJob, NewTspRecord};
    use quizvault_core::{FileArea, JobId, JobStatus, QuizIdentity};
    use tempfile::TempDir;
    use time::{Duration as TimeDuration, OffsetDateTime};

    async fn open_store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("metadata.db"), None)
            .await
            .unwrap();
        (dir, store)
    }

    fn new_file(area: FileArea, item_id: i64, path: &str, name: &str, hash: &str) -> NewFile {
        NewFile {
            component: "quiz_archiver".to_string(),
            area,
            item_id,
            file_path: path.to_string(),
            file_name: name.to_string(),
            content_hash: hash.to_string(),
            size: 42,
            mime_type: Some("application/gzip".to_string()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn destination(item_id: i64, path: &str, name: &str) -> FileDestination {
        FileDestination {
            component: "quiz_archiver".to_string(),
            area: FileArea::Artifact,
            item_id,
            file_path: path.to_string(),
            file_name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn new_job(identity: QuizIdentity) -> NewJob {
        NewJob {
            identity,
            user_id: 7,
            status: JobStatus::Finished,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_file() {
        let (_dir, store) = open_store().await;

        let row = store
            .insert_file(&new_file(FileArea::Artifact, 1, "/1/2/3/", "a.tar.gz", "h1"))
            .await
            .unwrap();
        assert!(row.id > 0);
        assert_eq!(row.file_area(), Some(FileArea::Artifact));

        let found = store
            .find_file("quiz_archiver", "artifact", 1, "/1/2/3/", "a.tar.gz")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, row.id);
        assert_eq!(found.content_hash, "h1");
        assert!(store.get_file(row.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_location_is_already_exists() {
        let (_dir, store) = open_store().await;
        let file = new_file(FileArea::Artifact, 1, "/1/", "a.tar.gz", "h1");

        store.insert_file(&file).await.unwrap();
        let err = store.insert_file(&file).await.unwrap_err();
        assert!(matches!(err, MetadataError::AlreadyExists(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_list_files_newest_first_with_filters() {
        let (_dir, store) = open_store().await;
        let base = OffsetDateTime::now_utc();

        for (i, path) in ["/1/2/3/", "/1/2/3/", "/1/2/4/"].iter().enumerate() {
            let mut file = new_file(FileArea::Artifact, i as i64, path, "a.tar.gz", "h");
            file.created_at = base + TimeDuration::seconds(i as i64);
            store.insert_file(&file).await.unwrap();
        }

        let rows = store
            .list_files(&AreaFilter {
                component: "quiz_archiver".to_string(),
                area: FileArea::Artifact,
                item_id: None,
                file_path: Some("/1/2/3/".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item_id, 1);
        assert_eq!(rows[1].item_id, 0);

        let all = store
            .list_files(&AreaFilter {
                component: "quiz_archiver".to_string(),
                area: FileArea::Artifact,
                item_id: Some(2),
                file_path: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].file_path, "/1/2/4/");
    }

    #[tokio::test]
    async fn test_relocate_file_moves_record() {
        let (_dir, store) = open_store().await;
        let mut upload = new_file(FileArea::Draft, 9, "/", "upload.tar.gz", "h1");
        upload.size = 1234;
        upload.mime_type = Some("application/x-tar".to_string());
        let draft = store.insert_file(&upload).await.unwrap();

        let moved = store
            .relocate_file(draft.id, FileArea::Draft, &destination(5, "/1/2/3/", "upload.tar.gz"))
            .await
            .unwrap();

        assert_ne!(moved.id, draft.id);
        assert_eq!(moved.area, "artifact");
        assert_eq!(moved.item_id, 5);
        assert_eq!(moved.content_hash, "h1");
        assert_eq!(moved.size, 1234);
        assert_eq!(moved.mime_type.as_deref(), Some("application/x-tar"));
        assert!(store.get_file(draft.id).await.unwrap().is_none());
        assert_eq!(store.count_files_with_hash("h1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_relocate_missing_source_writes_nothing() {
        let (_dir, store) = open_store().await;

        let err = store
            .relocate_file(12345, FileArea::Draft, &destination(5, "/1/", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
        assert_eq!(store.max_file_id().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_relocate_from_wrong_area_writes_nothing() {
        let (_dir, store) = open_store().await;
        let artifact = store
            .insert_file(&new_file(FileArea::Artifact, 1, "/1/1/1/", "a.tar.gz", "victim"))
            .await
            .unwrap();

        let err = store
            .relocate_file(artifact.id, FileArea::Draft, &destination(9, "/9/9/9/", "a.tar.gz"))
            .await
            .unwrap_err();
        match err {
            MetadataError::WrongArea {
                id,
                expected,
                actual,
            } => {
                assert_eq!(id, artifact.id);
                assert_eq!(expected, "draft");
                assert_eq!(actual, "artifact");
            }
            other => panic!("expected WrongArea, got {other:?}"),
        }

        let kept = store.get_file(artifact.id).await.unwrap().unwrap();
        assert_eq!(kept.file_path, "/1/1/1/");
        assert_eq!(kept.item_id, 1);
        assert!(
            store
                .find_file("quiz_archiver", "artifact", 9, "/9/9/9/", "a.tar.gz")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_relocate_conflict_keeps_source() {
        let (_dir, store) = open_store().await;
        store
            .insert_file(&new_file(FileArea::Artifact, 5, "/1/", "x", "h1"))
            .await
            .unwrap();
        let draft = store
            .insert_file(&new_file(FileArea::Draft, 1, "/", "x", "h2"))
            .await
            .unwrap();

        let err = store
            .relocate_file(draft.id, FileArea::Draft, &destination(5, "/1/", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::AlreadyExists(_)));
        assert!(store.get_file(draft.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_id_range_listing_and_watermark() {
        let (_dir, store) = open_store().await;
        assert_eq!(store.max_file_id().await.unwrap(), 0);

        let mut ids = Vec::new();
        for i in 0..5 {
            let row = store
                .insert_file(&new_file(FileArea::Temp, 0, "/0/", &format!("t{i}"), "h"))
                .await
                .unwrap();
            ids.push(row.id);
        }
        let watermark = store.max_file_id().await.unwrap();
        assert_eq!(watermark, *ids.last().unwrap());

        store
            .insert_file(&new_file(FileArea::Temp, 0, "/0/", "late", "h"))
            .await
            .unwrap();

        let first = store
            .list_files_in_id_range("quiz_archiver", "temp", 0, watermark, 3)
            .await
            .unwrap();
        assert_eq!(first.len(), 3);
        let rest = store
            .list_files_in_id_range("quiz_archiver", "temp", first[2].id, watermark, 3)
            .await
            .unwrap();
        assert_eq!(rest.len(), 2);
        assert!(rest.iter().all(|r| r.file_name != "late"));
    }

    #[tokio::test]
    async fn test_job_lifecycle() {
        let (_dir, store) = open_store().await;
        let identity = QuizIdentity::new(1, 2, 3);

        let job = store.create_job(&new_job(identity)).await.unwrap();
        let job_id = JobId::new(job.id).unwrap();
        assert_eq!(job.identity(), Some(identity));
        assert_eq!(job.job_status(), JobStatus::Finished);
        assert_eq!(job.user_id, 7);

        let reloaded = store.get_job(job_id).await.unwrap().unwrap();
        assert_eq!(reloaded.id, job.id);
        assert_eq!(reloaded.identity(), Some(identity));

        let missing = JobId::parse("9999999").unwrap();
        assert!(store.get_job(missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tsp_most_recent_record_wins() {
        let (_dir, store) = open_store().await;
        let job = store
            .create_job(&new_job(QuizIdentity::new(1, 2, 3)))
            .await
            .unwrap();
        let job_id = JobId::new(job.id).unwrap();
        assert!(store.find_tsp_by_job(job_id).await.unwrap().is_none());

        let base = OffsetDateTime::now_utc();
        for (offset, query) in [(0, b"old".to_vec()), (60, b"new".to_vec())] {
            store
                .create_tsp_record(&NewTspRecord {
                    job_id,
                    time_created: base + TimeDuration::seconds(offset),
                    server: "http://tsa.example".to_string(),
                    timestamp_query: query,
                    timestamp_reply: b"reply".to_vec(),
                })
                .await
                .unwrap();
        }

        let record = store.find_tsp_by_job(job_id).await.unwrap().unwrap();
        assert_eq!(record.timestamp_query, b"new");
        assert_eq!(record.server, "http://tsa.example");
    }

    #[tokio::test]
    async fn test_tsp_for_unknown_job_is_not_found() {
        let (_dir, store) = open_store().await;
        let err = store
            .create_tsp_record(&NewTspRecord {
                job_id: JobId::parse("404").unwrap(),
                time_created: OffsetDateTime::now_utc(),
                server: "tsa".to_string(),
                timestamp_query: vec![1],
                timestamp_reply: vec![2],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let (dir, store) = open_store().await;
        store.migrate().await.unwrap();
        drop(store);

        let reopened = SqliteStore::new(dir.path().join("metadata.db"), Some(30))
            .await
            .unwrap();
        reopened.health_check().await.unwrap();
        assert_eq!(reopened.max_file_id().await.unwrap(), 0);
    }
}
