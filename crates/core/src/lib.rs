//! Core domain types and shared logic for the quiz archive store.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Quiz identity triples and the storage paths derived from them
//! - Content digests under selectable algorithms
//! - Archive job ids and status
//! - File areas, virtual areas and temp file expiry paths
//! - Time source abstraction and configuration

pub mod area;
pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod identity;
pub mod job;

pub use area::{
    ARCHIVER_COMPONENT, DRAFT_COMPONENT, FileArea, TSP_QUERY_FILENAME, TSP_REPLY_FILENAME,
    TspPart, VirtualArea, parse_temp_expiry, temp_file_path,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use hash::{ContentHash, ContentHasher, DEFAULT_HASH_ALGORITHM, HashAlgorithm, hash_bytes};
pub use identity::{QuizIdentity, storage_path};
pub use job::{JobId, JobStatus};
