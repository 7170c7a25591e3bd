//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the media library
//! - Authentication middleware
//! - Request extractors

pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use leafpress_core::capability::CapabilityProvider;
use leafpress_core::media::MediaRepository;
use leafpress_core::storage::StorageService;
use leafpress_shared::JwtService;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Media repository for attachment persistence.
    pub media: Arc<dyn MediaRepository>,
    /// Storage service for file payloads.
    pub storage: Arc<StorageService>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Capability rules for authorization decisions.
    pub capabilities: Arc<dyn CapabilityProvider>,
    /// Base URL used for resource links.
    pub site_base_url: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(RequestBodyLimitLayer::new(state.max_upload_bytes))
        .with_state(state)
}
