//! Server test utilities.

use bytes::Bytes;
use quizvault_core::config::AppConfig;
use quizvault_core::{JobId, JobStatus, ManualClock, QuizIdentity};
use quizvault_metadata::models::{NewJob, NewTspRecord};
use quizvault_metadata::{MetadataStore, SqliteStore};
use quizvault_server::files::{FileLocation, FileStorage, StoredFile};
use quizvault_server::{AppState, create_router};
use quizvault_storage::{FilesystemBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;
use time::OffsetDateTime;

/// Epoch seconds the test clock starts at.
pub const START_TIME: i64 = 1_700_000_000;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        let storage: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(temp_dir.path().join("storage"))
                .await
                .expect("Failed to create storage backend"),
        );
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("metadata.db"), None)
                .await
                .expect("Failed to create metadata store"),
        );

        let clock = Arc::new(ManualClock::new(START_TIME));
        let state = AppState::new(config, storage, metadata, clock.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            clock,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Get access to the underlying object store.
    pub fn storage(&self) -> Arc<dyn ObjectStore> {
        self.state.storage.clone()
    }

    pub fn files(&self) -> Arc<FileStorage> {
        self.state.files.clone()
    }

    /// Register a finished archive job for `identity`.
    pub async fn create_job(&self, identity: QuizIdentity) -> JobId {
        let row = self
            .metadata()
            .create_job(&NewJob {
                identity,
                user_id: 2,
                status: JobStatus::Finished,
                created_at: OffsetDateTime::now_utc(),
            })
            .await
            .expect("Failed to create job");
        JobId::new(row.id).expect("Invalid job id")
    }

    /// Attach a TSP record to `job_id`.
    pub async fn create_tsp(&self, job_id: JobId, query: &[u8], reply: &[u8]) {
        self.metadata()
            .create_tsp_record(&NewTspRecord {
                job_id,
                time_created: OffsetDateTime::now_utc(),
                server: "http://timestamp.example.org".to_string(),
                timestamp_query: query.to_vec(),
                timestamp_reply: reply.to_vec(),
            })
            .await
            .expect("Failed to create TSP record");
    }

    /// Place `data` in the draft area.
    pub async fn create_draft(&self, item_id: i64, name: &str, data: Bytes) -> StoredFile {
        self.files()
            .create_file(
                &FileLocation::draft(item_id, name),
                data,
                Some("application/gzip"),
            )
            .await
            .expect("Failed to create draft")
    }

    /// Upload `data` as a draft and store it as the artifact of `job_id`.
    pub async fn store_artifact(
        &self,
        identity: QuizIdentity,
        job_id: JobId,
        data: Bytes,
    ) -> StoredFile {
        let draft = self
            .create_draft(job_id.as_i64(), &format!("quiz-{job_id}.tar.gz"), data)
            .await;
        self.state
            .artifacts(identity)
            .store_uploaded_artifact(draft, job_id)
            .await
            .expect("Failed to store artifact")
    }
}
