//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`        - Storage health check (public)
//! - `/api/Project/*`      - Project CRUD and attachments
//! - `/api/Blog/*`         - Blog post CRUD and attachments
//!
//! Reads are public; writes require the admin bearer token.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, stricter on writes
//! - **Body limit** - `MAX_UPLOAD_BYTES` for multipart uploads
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::domain::entities::EntityKind;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes of one kind with rate limiting: reads and writes get separate buckets.
fn kind_router(state: &AppState, kind: EntityKind) -> Router<AppState> {
    let service = state.service(kind);

    let public = api::routes::public_routes(service.clone()).layer(rate_limit::layer());
    let protected = api::routes::protected_routes(service, state.auth_service.clone())
        .layer(rate_limit::secure_layer());

    public.merge(protected)
}

/// Constructs the application router with all routes and middleware.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>` because rate limiting
/// keys on the peer address.
pub fn app_router(state: AppState, max_upload_bytes: usize) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/Project", kind_router(&state, EntityKind::Project))
        .nest("/api/Blog", kind_router(&state, EntityKind::Blog))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
