//! File download handlers.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

fn attachment(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

/// GET /v1/stored/{file_id} - Stream a stored file's content.
pub async fn download_stored_file(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> ApiResult<Response> {
    let file = state.files.get_file(file_id).await?;
    let stream = state.files.open_stream(&file).await?;
    let mime_type = file.mime_type().unwrap_or(DEFAULT_MIME_TYPE);
    let length = file.size().to_string();
    let disposition = attachment(file.file_name());

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, mime_type),
            (CONTENT_LENGTH, length.as_str()),
            (CONTENT_DISPOSITION, disposition.as_str()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// GET /v1/files/{area}/{*path} - Resolve a virtual file.
///
/// The wildcard capture drops the leading `/`; it is restored before
/// resolution so the resolver sees the full relative path.
pub async fn get_virtual_file(
    State(state): State<AppState>,
    Path((area, path)): Path<(String, String)>,
) -> ApiResult<Response> {
    let path = format!("/{path}");
    let file = state.resolver.resolve(&area, &path).await?;
    let length = file.len().to_string();
    let disposition = attachment(file.filename);

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, file.mime_type),
            (CONTENT_LENGTH, length.as_str()),
            (CONTENT_DISPOSITION, disposition.as_str()),
        ],
        Body::from_stream(file.into_stream()),
    )
        .into_response())
}
