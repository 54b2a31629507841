//! Shared request parsing and response types.

use crate::error::{ApiError, ApiResult};
use crate::files::StoredFile;
use quizvault_core::{FileArea, QuizIdentity};
use serde::Serialize;

/// Descriptor of a managed file.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub file_id: i64,
    pub area: FileArea,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub content_hash: String,
    pub size: u64,
    pub mime_type: Option<String>,
    /// Creation time as epoch seconds.
    pub created_at: i64,
}

impl From<&StoredFile> for FileResponse {
    fn from(file: &StoredFile) -> Self {
        Self {
            file_id: file.id(),
            area: file.area(),
            item_id: file.item_id(),
            file_path: file.file_path().to_string(),
            file_name: file.file_name().to_string(),
            content_hash: file.content_hash().to_string(),
            size: file.size(),
            mime_type: file.mime_type().map(str::to_string),
            created_at: file.created_at().unix_timestamp(),
        }
    }
}

/// Parse the `{course}/{cm}/{quiz}` route segments.
pub fn parse_identity(segments: &(String, String, String)) -> ApiResult<QuizIdentity> {
    let (course, cm, quiz) = segments;
    Ok(QuizIdentity::from_segments(course, cm, quiz)?)
}

/// Validate a caller-supplied file name.
///
/// Names are single path components without control characters.
pub fn validate_file_name(name: &str) -> ApiResult<()> {
    if name.is_empty() || name.len() > 255 {
        return Err(ApiError::BadRequest(
            "file name must be 1 to 255 bytes".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(ApiError::BadRequest("file name is reserved".to_string()));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(ApiError::BadRequest(
            "file name contains an illegal character".to_string(),
        ));
    }
    Ok(())
}
