//! API route configuration for one entity kind.
//!
//! The same table is mounted twice, at `/api/Project` and `/api/Blog`, each
//! with its own [`EntityService`].

use crate::api::handlers::{
    attachment_handler, create_entity_handler, delete_entity_handler, get_entity_handler,
    list_entities_handler, update_entity_handler,
};
use crate::api::middleware::auth;
use crate::application::services::{AuthService, EntityService};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Read routes; no authentication.
///
/// # Endpoints
///
/// - `GET /`                              - List entities
/// - `GET /{id}`                          - One entity with attachment content
/// - `GET /attachments/{attachment_id}`   - Raw attachment bytes
pub fn public_routes<S>(service: Arc<EntityService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_entities_handler))
        .route("/{id}", get(get_entity_handler))
        .route("/attachments/{attachment_id}", get(attachment_handler))
        .with_state(service)
}

/// Write routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /`      - Create an entity
/// - `PUT    /{id}`  - Rewrite an entity
/// - `DELETE /{id}`  - Delete an entity and its attachments
pub fn protected_routes<S>(service: Arc<EntityService>, auth: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(create_entity_handler))
        .route(
            "/{id}",
            put(update_entity_handler).delete(delete_entity_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth, auth::layer))
        .with_state(service)
}

/// Read and write routes of one kind, ready to be nested.
pub fn entity_routes<S>(service: Arc<EntityService>, auth: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    public_routes(service.clone()).merge(protected_routes(service, auth))
}
