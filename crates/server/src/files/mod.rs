//! Artifact storage and secure retrieval.
//!
//! - [`FileStorage`]: managed files over the object store and metadata store
//! - [`ArtifactStore`]: permanent artifacts of one quiz
//! - [`AttemptExtractor`]: per-attempt extraction into expiring temp files
//! - [`VirtualFileResolver`]: ledger-validated TSP files
//! - [`TempFileJanitor`]: sweep of expired temp files

pub mod artifacts;
pub mod error;
pub mod extract;
pub mod janitor;
pub mod storage;
pub mod virtual_files;

pub use artifacts::ArtifactStore;
pub use error::{FileError, FileResult};
pub use extract::AttemptExtractor;
pub use janitor::{SweepStats, TempFileJanitor};
pub use storage::{FileLocation, FileStorage, StoredFile};
pub use virtual_files::{
    JobLedger, JobRecord, MetadataLedger, TspData, TspLedger, VirtualFile, VirtualFileResolver,
};
