use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest answer upload accepted
pub const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Interview lifecycle
        .route("/interviews", post(handlers::start_interview))
        .route(
            "/interviews/:session_id",
            get(handlers::get_interview).delete(handlers::exit_interview),
        )
        .route(
            "/interviews/:session_id/response",
            put(handlers::upload_response).delete(handlers::reset_response),
        )
        .route("/interviews/:session_id/navigate", post(handlers::navigate))
        // Camera
        .route(
            "/interviews/:session_id/recording/start",
            post(handlers::start_recording),
        )
        .route(
            "/interviews/:session_id/recording/stop",
            post(handlers::stop_recording),
        )
        .route("/interviews/:session_id/complete", post(handlers::complete_interview))
        // Playback
        .route("/previews/:preview_id", get(handlers::get_preview))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
