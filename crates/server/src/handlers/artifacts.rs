//! Artifact handlers.

use crate::error::{ApiError, ApiResult};
use crate::files::{FileError, JobLedger, MetadataLedger};
use crate::handlers::common::{FileResponse, parse_identity};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use quizvault_core::{JobId, QuizIdentity, parse_temp_expiry};
use serde::{Deserialize, Serialize};

/// Store artifact request.
#[derive(Debug, Deserialize)]
pub struct StoreArtifactRequest {
    /// File id of the uploaded draft.
    pub draft_id: i64,
    /// Archive job that produced the artifact.
    pub job_id: i64,
}

/// Artifact listing.
#[derive(Debug, Serialize)]
pub struct ListArtifactsResponse {
    pub artifacts: Vec<FileResponse>,
}

/// Extracted attempt descriptor.
#[derive(Debug, Serialize)]
pub struct ExtractAttemptResponse {
    #[serde(flatten)]
    pub file: FileResponse,
    /// Epoch seconds after which the file may be swept.
    pub expires_at: i64,
}

/// The job must exist and belong to the quiz addressed by the route.
async fn require_job_for_quiz(
    state: &AppState,
    job_id: JobId,
    identity: QuizIdentity,
) -> ApiResult<()> {
    let job = MetadataLedger::new(state.metadata.clone())
        .find_job(job_id)
        .await?
        .ok_or(FileError::JobNotFound(job_id))?;
    if job.identity != identity {
        return Err(FileError::ResourceIdMismatch { field: "job" }.into());
    }
    Ok(())
}

/// POST /v1/quizzes/{course}/{cm}/{quiz}/artifacts - Store an uploaded draft.
pub async fn store_artifact(
    State(state): State<AppState>,
    Path(segments): Path<(String, String, String)>,
    Json(body): Json<StoreArtifactRequest>,
) -> ApiResult<(StatusCode, Json<FileResponse>)> {
    let identity = parse_identity(&segments)?;
    let job_id = JobId::new(body.job_id)?;
    require_job_for_quiz(&state, job_id, identity).await?;

    let draft = state.files.get_file(body.draft_id).await?;
    let artifact = state
        .artifacts(identity)
        .store_uploaded_artifact(draft, job_id)
        .await?;

    Ok((StatusCode::CREATED, Json(FileResponse::from(&artifact))))
}

/// GET /v1/quizzes/{course}/{cm}/{quiz}/artifacts - List artifacts, newest first.
pub async fn list_artifacts(
    State(state): State<AppState>,
    Path(segments): Path<(String, String, String)>,
) -> ApiResult<Json<ListArtifactsResponse>> {
    let identity = parse_identity(&segments)?;
    let artifacts = state.artifacts(identity).get_stored_artifacts().await?;

    Ok(Json(ListArtifactsResponse {
        artifacts: artifacts.iter().map(FileResponse::from).collect(),
    }))
}

/// DELETE /v1/quizzes/{course}/{cm}/{quiz}/artifacts/{file_id} - Delete one artifact.
pub async fn delete_artifact(
    State(state): State<AppState>,
    Path((course, cm, quiz, file_id)): Path<(String, String, String, i64)>,
) -> ApiResult<StatusCode> {
    let identity = parse_identity(&(course, cm, quiz))?;
    let store = state.artifacts(identity);
    let artifact = store.get_artifact(file_id).await?;
    store.delete_artifact(artifact).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/quizzes/{course}/{cm}/{quiz}/artifacts/{file_id}/attempts/{attempt_id}
///
/// Extract one attempt's data into a temp file.
pub async fn extract_attempt(
    State(state): State<AppState>,
    Path((course, cm, quiz, file_id, attempt_id)): Path<(String, String, String, i64, u64)>,
) -> ApiResult<(StatusCode, Json<ExtractAttemptResponse>)> {
    let identity = parse_identity(&(course, cm, quiz))?;
    let artifact = state.artifacts(identity).get_artifact(file_id).await?;
    let job_id = JobId::new(artifact.item_id())?;

    let temp = state
        .extractor()
        .extract_attempt_data(&artifact, job_id, attempt_id)
        .await?;
    let expires_at = parse_temp_expiry(temp.file_path()).map_err(|e| {
        ApiError::Internal(format!("extracted file has a malformed expiry path: {e}"))
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ExtractAttemptResponse {
            file: FileResponse::from(&temp),
            expires_at,
        }),
    ))
}
