use crate::api::{handlers, AppState};
use crate::metrics::track_http_metrics;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Incidents
        .route(
            "/v1/incidents",
            get(handlers::list_incidents).post(handlers::create_incident),
        )
        .route(
            "/v1/incidents/responsible/:email",
            get(handlers::list_by_responsible),
        )
        .route(
            "/v1/incidents/:id",
            get(handlers::get_incident)
                .put(handlers::update_incident)
                .delete(handlers::delete_incident),
        )
        .route("/v1/incidents/:id/status", patch(handlers::patch_status))
        // Comments
        .route("/v1/comments", post(handlers::create_comment))
        .route(
            "/v1/comments/incident/:incident_id",
            get(handlers::list_comments),
        )
        .route("/v1/comments/:id", delete(handlers::delete_comment))
        // Stats
        .route("/v1/stats/incidents", get(handlers::get_stats))
        .route("/v1/stats/cache", get(handlers::get_cache_stats))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(track_http_metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
