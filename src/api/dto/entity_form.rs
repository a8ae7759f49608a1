//! Multipart form parsing for entity writes.
//!
//! Part names follow the form field names used by the UI (`Name`,
//! `Description`, `Categories`, `Technologies`, `IsTagged`, `Files`, `Id`).
//! Matching is case-insensitive and a trailing `[]` is ignored.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::application::services::EntityWrite;
use crate::domain::entities::{EntityFields, FieldUpdate, NewAttachment};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("field '{field}' must be an integer, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field '{field}' must be a boolean, got '{value}'")]
    InvalidBool { field: &'static str, value: String },
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                AppError::payload_too_large("Upload exceeds the size limit", json!({}))
            }
            FormError::Multipart(e) => AppError::bad_request(
                "Malformed multipart body",
                json!({ "reason": e.body_text() }),
            ),
            other => AppError::bad_request(other.to_string(), json!({})),
        }
    }
}

/// A parsed entity write form.
#[derive(Debug, Default)]
pub struct EntityForm {
    pub id: Option<i64>,
    pub fields: EntityFields,
    /// `Some` as soon as any `Files` part was sent, even an empty placeholder.
    pub files: Option<Vec<NewAttachment>>,
    pub version: Option<i64>,
    pub keep_attachments: bool,
}

impl EntityForm {
    /// Reads every part of the body.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] for unparsable scalar parts or a broken body.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = normalize_part_name(field.name().unwrap_or_default());

            if name == "files" {
                let file_name = field.file_name().map(str::to_string);
                let content = field.bytes().await?;
                form.add_file(file_name.as_deref(), content.to_vec());
            } else {
                let value = field.text().await?;
                form.set_text(&name, &value)?;
            }
        }

        Ok(form)
    }

    /// Applies one non-file part. Unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let update = match name {
            "id" => {
                self.id = parse_optional_i64("Id", value)?;
                return Ok(());
            }
            "version" => {
                self.version = parse_optional_i64("Version", value)?;
                return Ok(());
            }
            "keepattachments" => {
                self.keep_attachments = parse_bool("KeepAttachments", value)?;
                return Ok(());
            }
            "name" => FieldUpdate::Name(value.to_string()),
            "description" => FieldUpdate::Description(value.to_string()),
            "categories" => FieldUpdate::Categories(value.to_string()),
            "technologies" => FieldUpdate::technologies_from_str(value),
            "istagged" => FieldUpdate::Tagged(parse_bool("IsTagged", value)?),
            other => {
                debug!(part = other, "ignoring unknown form part");
                return Ok(());
            }
        };

        self.fields.apply(update);
        Ok(())
    }

    /// Records a `Files` part.
    ///
    /// A part with neither a filename nor content is what a browser sends for an
    /// empty file input: it marks the file set as present without adding a file.
    pub fn add_file(&mut self, file_name: Option<&str>, content: Vec<u8>) {
        let files = self.files.get_or_insert_with(Vec::new);

        let file_name = file_name.unwrap_or_default();
        if file_name.is_empty() && content.is_empty() {
            return;
        }

        files.push(NewAttachment::new(file_name, content));
    }

    /// Splits the form into create inputs. A missing file set means no files.
    pub fn into_create(self) -> (EntityFields, Vec<NewAttachment>) {
        (self.fields, self.files.unwrap_or_default())
    }

    /// Converts the form into an update request.
    ///
    /// `KeepAttachments=true` leaves the stored set alone even if files were sent.
    pub fn into_write(self) -> EntityWrite {
        EntityWrite {
            id: self.id,
            fields: self.fields,
            attachments: if self.keep_attachments {
                None
            } else {
                self.files
            },
            expected_version: self.version,
        }
    }
}

fn normalize_part_name(raw: &str) -> String {
    raw.trim().trim_end_matches("[]").to_ascii_lowercase()
}

fn parse_optional_i64(field: &'static str, value: &str) -> Result<Option<i64>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse()
        .map(Some)
        .map_err(|_| FormError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" | "" => Ok(false),
        other => Err(FormError::InvalidBool {
            field,
            value: other.to_string(),
        }),
    }
}
