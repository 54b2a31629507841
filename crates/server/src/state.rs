//! Application state shared across handlers.

use crate::files::{
    ArtifactStore, AttemptExtractor, FileStorage, TempFileJanitor, VirtualFileResolver,
};
use quizvault_core::config::AppConfig;
use quizvault_core::{Clock, QuizIdentity};
use quizvault_metadata::MetadataStore;
use quizvault_storage::ObjectStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn ObjectStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub files: Arc<FileStorage>,
    pub resolver: Arc<VirtualFileResolver>,
    pub janitor: Arc<TempFileJanitor>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let files = Arc::new(FileStorage::new(storage.clone(), metadata.clone(), clock));
        let resolver = Arc::new(VirtualFileResolver::from_metadata(metadata.clone()));
        let janitor = Arc::new(TempFileJanitor::new(
            files.clone(),
            config.janitor.batch_size,
        ));

        Self {
            config: Arc::new(config),
            storage,
            metadata,
            files,
            resolver,
            janitor,
        }
    }

    /// Artifact store bound to `identity`.
    pub fn artifacts(&self, identity: QuizIdentity) -> ArtifactStore {
        ArtifactStore::new(self.files.clone(), identity)
    }

    pub fn extractor(&self) -> AttemptExtractor {
        AttemptExtractor::new(
            self.files.clone(),
            self.config.extraction.temp_retention(),
        )
    }
}
