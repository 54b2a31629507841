//! HTTP request handlers.

pub mod admin;
pub mod artifacts;
pub mod common;
pub mod drafts;
pub mod files;

pub use admin::*;
pub use artifacts::*;
pub use common::*;
pub use drafts::*;
pub use files::*;
