//! JSON projections of entities and attachments.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{
    Attachment, AttachmentMeta, ContentEntity, EntityDetail, EntityKind, EntitySummary,
};

/// Download path of an attachment under its kind's route.
pub fn attachment_url(kind: EntityKind, attachment_id: i64) -> String {
    format!("/api/{}/attachments/{}", kind.route_name(), attachment_id)
}

/// Location of an entity under its kind's route.
pub fn entity_url(kind: EntityKind, id: i64) -> String {
    format!("/api/{}/{}", kind.route_name(), id)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: i64,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub url: String,
    /// Base64 content; only on item fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl AttachmentResponse {
    pub fn from_meta(kind: EntityKind, meta: &AttachmentMeta) -> Self {
        Self {
            id: meta.id,
            file_name: meta.file_name.clone(),
            content_type: meta.content_type().to_string(),
            size: meta.size_bytes,
            url: attachment_url(kind, meta.id),
            content: None,
        }
    }

    pub fn with_content(kind: EntityKind, attachment: &Attachment) -> Self {
        Self {
            content: Some(STANDARD.encode(&attachment.content)),
            ..Self::from_meta(kind, &attachment.meta)
        }
    }
}

/// Entity projection shared by item, list and create responses.
///
/// `technologies` and `isTagged` are only serialized for projects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub categories: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tagged: Option<bool>,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub version: i64,
    pub attachments: Vec<AttachmentResponse>,
}

impl EntityResponse {
    fn new(entity: &ContentEntity, attachments: Vec<AttachmentResponse>) -> Self {
        let project = entity.kind.has_project_fields();
        let fields = &entity.fields;

        Self {
            id: entity.id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            categories: fields.categories.clone(),
            technologies: project.then(|| fields.technologies.clone()),
            is_tagged: project.then_some(fields.is_tagged),
            date_added: entity.created_at,
            date_modified: entity.updated_at,
            version: entity.version,
            attachments,
        }
    }
}

impl From<&EntitySummary> for EntityResponse {
    fn from(summary: &EntitySummary) -> Self {
        let kind = summary.entity.kind;
        let attachments = summary
            .attachments
            .iter()
            .map(|m| AttachmentResponse::from_meta(kind, m))
            .collect();

        Self::new(&summary.entity, attachments)
    }
}

impl From<&EntityDetail> for EntityResponse {
    fn from(detail: &EntityDetail) -> Self {
        let kind = detail.entity.kind;
        let attachments = detail
            .attachments
            .iter()
            .map(|a| AttachmentResponse::with_content(kind, a))
            .collect();

        Self::new(&detail.entity, attachments)
    }
}

/// Listing row: the entity plus its preview attachment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityListItem {
    #[serde(flatten)]
    pub entity: EntityResponse,
    pub cover: Option<AttachmentResponse>,
    pub attachment_count: usize,
}

impl From<&EntitySummary> for EntityListItem {
    fn from(summary: &EntitySummary) -> Self {
        let kind = summary.entity.kind;

        Self {
            entity: EntityResponse::from(summary),
            cover: summary
                .cover()
                .map(|m| AttachmentResponse::from_meta(kind, m)),
            attachment_count: summary.attachments.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityFields;
    use serde_json::json;

    fn entity(kind: EntityKind) -> ContentEntity {
        ContentEntity {
            id: 3,
            kind,
            fields: EntityFields {
                name: "Portfolio Site".to_string(),
                description: "d".to_string(),
                categories: "Fullstack".to_string(),
                technologies: vec!["React JS".to_string()],
                is_tagged: true,
            },
            version: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn meta(id: i64, name: &str) -> AttachmentMeta {
        AttachmentMeta {
            id,
            entity_id: 3,
            file_name: name.to_string(),
            size_bytes: 4,
        }
    }

    #[test]
    fn test_project_projection_is_camel_case() {
        let summary = EntitySummary {
            entity: entity(EntityKind::Project),
            attachments: vec![meta(9, "diagram.png")],
        };

        let value = serde_json::to_value(EntityResponse::from(&summary)).unwrap();

        assert_eq!(value["technologies"], json!(["React JS"]));
        assert_eq!(value["isTagged"], true);
        assert_eq!(value["version"], 2);
        assert!(value.get("dateAdded").is_some());
        assert_eq!(value["attachments"][0]["fileName"], "diagram.png");
        assert_eq!(value["attachments"][0]["contentType"], "image/png");
        assert_eq!(value["attachments"][0]["url"], "/api/Project/attachments/9");
        assert!(value["attachments"][0].get("content").is_none());
    }

    #[test]
    fn test_blog_projection_omits_project_fields() {
        let summary = EntitySummary {
            entity: entity(EntityKind::Blog),
            attachments: Vec::new(),
        };

        let value = serde_json::to_value(EntityResponse::from(&summary)).unwrap();

        assert!(value.get("technologies").is_none());
        assert!(value.get("isTagged").is_none());
    }

    #[test]
    fn test_detail_carries_base64_content() {
        let detail = EntityDetail {
            entity: entity(EntityKind::Project),
            attachments: vec![Attachment {
                meta: meta(1, "notes.txt"),
                content: b"hello".to_vec(),
            }],
        };

        let value = serde_json::to_value(EntityResponse::from(&detail)).unwrap();

        assert_eq!(value["attachments"][0]["content"], "aGVsbG8=");
    }

    #[test]
    fn test_list_item_cover_and_count() {
        let summary = EntitySummary {
            entity: entity(EntityKind::Project),
            attachments: vec![meta(1, "cover.jpg"), meta(2, "cv.pdf")],
        };

        let value = serde_json::to_value(EntityListItem::from(&summary)).unwrap();

        assert_eq!(value["attachmentCount"], 2);
        assert_eq!(value["cover"]["id"], 1);
        assert_eq!(value["name"], "Portfolio Site");
    }
}
