//! API routes.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::sessions::{
    create_session, delete_session, detect, get_session, set_crop, upload_image,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let session_routes = Router::new()
        .route("/sessions", post(create_session))
        .route(
            "/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        // Image upload (raw body, declared type via Content-Type)
        .route("/sessions/:session_id/image", post(upload_image))
        // Live crop selection updates
        .route("/sessions/:session_id/crop", put(set_crop))
        // Run the normalization + detection pipeline
        .route("/sessions/:session_id/detect", post(detect));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", session_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Request body size limit caps uploads before they reach a handler
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
