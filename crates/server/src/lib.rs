//! HTTP service for quiz archive artifact storage and secure retrieval.
//!
//! This crate provides:
//! - Draft uploads and their move into permanent artifact storage
//! - Artifact listing, deletion and download
//! - Extraction of single attempts into expiring temp files
//! - Ledger-validated TSP virtual files
//! - The temp file janitor
//! - Prometheus metrics

pub mod error;
pub mod files;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
