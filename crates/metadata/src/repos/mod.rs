//! Repository traits for metadata operations.

pub mod files;
pub mod jobs;
pub mod tsp;

pub use files::FileRepo;
pub use jobs::JobRepo;
pub use tsp::TspRepo;
