//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::contacts::PipelineSettings;
use crate::domains::schools::EnrichmentSettings;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    enrich_batch_handler, get_only, health_handler, post_only, schools_handler,
    search_ads_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: ServerDeps,
    pub pipeline: Arc<PipelineSettings>,
    pub enrichment: Arc<EnrichmentSettings>,
}

/// Build the Axum application router
pub fn build_app(
    deps: ServerDeps,
    pipeline: PipelineSettings,
    enrichment: EnrichmentSettings,
) -> Router {
    let app_state = AxumAppState {
        deps,
        pipeline: Arc::new(pipeline),
        enrichment: Arc::new(enrichment),
    };

    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search-ads", post(search_ads_handler).fallback(post_only))
        .route(
            "/api/enrich-batch",
            post(enrich_batch_handler).fallback(post_only),
        )
        .route("/api/schools", get(schools_handler).fallback(get_only))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
