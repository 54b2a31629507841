//! Draft upload handler.

use crate::error::{ApiError, ApiResult};
use crate::files::FileLocation;
use crate::handlers::common::{FileResponse, validate_file_name};
use crate::metrics::{BYTES_UPLOADED, DRAFTS_UPLOADED};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};

/// PUT /v1/drafts/{item_id}/{file_name} - Place the request body in the draft area.
pub async fn upload_draft(
    State(state): State<AppState>,
    Path((item_id, file_name)): Path<(i64, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<FileResponse>)> {
    if item_id < 0 {
        return Err(ApiError::BadRequest("item id must not be negative".to_string()));
    }
    validate_file_name(&file_name)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("draft body is empty".to_string()));
    }

    let mime_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let file = state
        .files
        .create_file(
            &FileLocation::draft(item_id, file_name),
            body,
            mime_type.as_deref(),
        )
        .await?;

    DRAFTS_UPLOADED.inc();
    BYTES_UPLOADED.inc_by(file.size());
    tracing::info!(file_id = file.id(), item_id, size = file.size(), "Draft uploaded");

    Ok((StatusCode::CREATED, Json(FileResponse::from(&file))))
}
