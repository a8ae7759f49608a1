//! Handler for raw attachment download.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;

use crate::application::services::EntityService;
use crate::error::AppError;

/// Streams the stored bytes of one attachment.
///
/// # Endpoint
///
/// `GET /api/{Project,Blog}/attachments/{attachment_id}`
///
/// # Response Headers
///
/// - `Content-Type` from the filename extension (never sniffed)
/// - `Content-Disposition: inline` with the stored filename
/// - `X-Content-Type-Options: nosniff`
///
/// # Errors
///
/// Returns 404 if the attachment does not exist or belongs to the other kind.
pub async fn attachment_handler(
    State(service): State<Arc<EntityService>>,
    Path(attachment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attachment = service.fetch_attachment(attachment_id).await?;

    let headers = [
        (header::CONTENT_TYPE, attachment.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&attachment.meta.file_name),
        ),
        (header::CONTENT_LENGTH, attachment.content.len().to_string()),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
    ];

    Ok((headers, attachment.content))
}

/// Builds an `inline` disposition.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*`.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if file_name.is_ascii() {
        format!("inline; filename=\"{fallback}\"")
    } else {
        format!(
            "inline; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(file_name, ATTR_CHAR_ESCAPES)
        )
    }
}

/// Bytes outside the RFC 5987 `attr-char` set.
const ATTR_CHAR_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');
