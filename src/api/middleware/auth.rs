//! Bearer token authentication middleware for write routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use std::sync::Arc;

use crate::application::services::AuthService;
use crate::error::AppError;

/// Authenticates requests using the `Authorization: Bearer <token>` header.
///
/// Applied with `route_layer` to `POST`, `PUT` and `DELETE` routes only; reads
/// stay public.
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header is
/// missing or malformed, or the token does not match the admin token.
pub async fn layer(
    State(auth): State<Arc<AuthService>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    auth.authenticate(&token)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
