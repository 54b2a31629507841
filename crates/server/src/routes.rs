//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes_usize();

    let mut router = Router::new()
        .route("/v1/health", get(handlers::health_check))
        // Draft holding area
        .route(
            "/v1/drafts/{item_id}/{file_name}",
            put(handlers::upload_draft),
        )
        // Artifacts of one quiz
        .route(
            "/v1/quizzes/{course}/{cm}/{quiz}/artifacts",
            post(handlers::store_artifact).get(handlers::list_artifacts),
        )
        .route(
            "/v1/quizzes/{course}/{cm}/{quiz}/artifacts/{file_id}",
            delete(handlers::delete_artifact),
        )
        .route(
            "/v1/quizzes/{course}/{cm}/{quiz}/artifacts/{file_id}/attempts/{attempt_id}",
            post(handlers::extract_attempt),
        )
        // Retrieval
        .route("/v1/stored/{file_id}", get(handlers::download_stored_file))
        .route("/v1/files/{area}/{*path}", get(handlers::get_virtual_file))
        // Maintenance
        .route("/v1/admin/janitor", post(handlers::run_janitor));

    // When enabled, the endpoint must be reachable by the scraper only
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    router
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
