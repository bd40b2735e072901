//! Axum server setup and routing.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

/// Create the Axum router with all routes.
///
/// `cors_origins` is `*` or a comma-separated list of allowed origins.
pub fn create_router(state: Arc<AppState>, cors_origins: &str) -> Router {
    Router::new()
        .route("/", get(api::info::root))
        .route("/health", get(api::health::health))
        .route("/version", get(api::info::version))
        .route("/docs", get(api::info::docs))
        .route("/about", get(api::info::about))
        .route("/contact", get(api::info::contact))
        .route("/privacy", get(api::info::privacy))
        .route("/terms", get(api::info::terms))
        .route("/feedback", get(api::info::feedback))
        .route("/support", get(api::info::support))
        .route("/predict", get(api::predict::predict))
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.trim() == "*" {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        layer.allow_origin(allowed)
    }
}
