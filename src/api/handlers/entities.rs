//! Handlers for entity CRUD endpoints, shared by projects and blog posts.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use crate::api::dto::entity::{EntityListItem, EntityResponse, entity_url};
use crate::api::dto::entity_form::EntityForm;
use crate::api::dto::list_params::ListParams;
use crate::application::services::EntityService;
use crate::error::AppError;

/// Creates an entity from a multipart form.
///
/// # Endpoint
///
/// `POST /api/{Project,Blog}`
///
/// # Form Parts
///
/// `Name`, `Description`, `Categories` (required), `Technologies` and
/// `IsTagged` (projects only), `Files` (zero or more).
///
/// # Response
///
/// `201 Created` with a `Location` header and the entity without attachment
/// content.
///
/// # Errors
///
/// - 400 if a required field is empty or a scalar part is malformed
/// - 413 if the body exceeds the upload limit
pub async fn create_entity_handler(
    State(service): State<Arc<EntityService>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (fields, files) = EntityForm::from_multipart(multipart).await?.into_create();

    let created = service.create_entity(fields, files).await?;
    let location = entity_url(service.kind(), created.entity.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(EntityResponse::from(&created)),
    ))
}

/// Lists entities with their first attachment as cover.
///
/// # Endpoint
///
/// `GET /api/{Project,Blog}?order=inserted|newest|modified|featured&page=1&page_size=25`
pub async fn list_entities_handler(
    State(service): State<Arc<EntityService>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EntityListItem>>, AppError> {
    let query = params
        .into_query()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let entities = service.list_entities(query).await?;

    Ok(Json(entities.iter().map(EntityListItem::from).collect()))
}

/// Returns one entity with full attachment content (base64).
///
/// # Endpoint
///
/// `GET /api/{Project,Blog}/{id}`
pub async fn get_entity_handler(
    State(service): State<Arc<EntityService>>,
    Path(id): Path<i64>,
) -> Result<Json<EntityResponse>, AppError> {
    let detail = service.get_entity(id).await?;
    Ok(Json(EntityResponse::from(&detail)))
}

/// Rewrites an entity.
///
/// # Endpoint
///
/// `PUT /api/{Project,Blog}/{id}`
///
/// The form mirrors create plus `Id` (must equal the path id), an optional
/// `Version` and an optional `KeepAttachments`. Any `Files` part replaces the
/// whole attachment set; a single empty `Files` part clears it.
///
/// # Errors
///
/// - 400 on id mismatch or invalid fields
/// - 404 if the entity does not exist
/// - 409 if `Version` is stale
pub async fn update_entity_handler(
    State(service): State<Arc<EntityService>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<StatusCode, AppError> {
    let write = EntityForm::from_multipart(multipart).await?.into_write();

    service.update_entity(id, write).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes an entity and all of its attachments.
///
/// # Endpoint
///
/// `DELETE /api/{Project,Blog}/{id}`
pub async fn delete_entity_handler(
    State(service): State<Arc<EntityService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service.delete_entity(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
