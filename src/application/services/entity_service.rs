//! Entity service: the create/read/update/delete contract for one content kind.

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::entities::{
    Attachment, EntityDetail, EntityFields, EntityKind, EntitySummary, EntityUpdate, ListQuery,
    NewAttachment, NewEntity,
};
use crate::domain::repositories::{BlobStore, ContentRepository};
use crate::error::AppError;

/// A validated-at-the-boundary write request for an existing entity.
#[derive(Debug, Clone, Default)]
pub struct EntityWrite {
    /// Identifier carried in the payload; must match the path identifier.
    pub id: Option<i64>,
    pub fields: EntityFields,
    /// `Some` replaces the attachment set (an empty list clears it); `None` keeps it.
    pub attachments: Option<Vec<NewAttachment>>,
    /// Version the client last read. `None` makes the update unconditional.
    pub expected_version: Option<i64>,
}

/// Service for one entity kind (projects or blog posts).
///
/// Both kinds share the same state machine, so the server runs two instances
/// of this type that differ only in `kind`. Storage errors are never retried
/// here; they propagate to the HTTP boundary.
pub struct EntityService {
    kind: EntityKind,
    repository: Arc<dyn ContentRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl EntityService {
    pub fn new(
        kind: EntityKind,
        repository: Arc<dyn ContentRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            kind,
            repository,
            blobs,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Validates the fields and persists the entity together with its files.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] listing every empty required field.
    /// Returns [`AppError::Storage`] if the write fails; nothing is persisted then.
    pub async fn create_entity(
        &self,
        fields: EntityFields,
        files: Vec<NewAttachment>,
    ) -> Result<EntitySummary, AppError> {
        let fields = fields.for_kind(self.kind);
        fields.validate()?;

        let file_count = files.len();
        let created = self
            .repository
            .create(
                self.kind,
                NewEntity {
                    fields,
                    attachments: files,
                },
            )
            .await?;

        info!(
            kind = %self.kind,
            id = created.entity.id,
            attachments = file_count,
            "entity created"
        );

        Ok(created)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entity of this kind has the id.
    pub async fn get_entity(&self, id: i64) -> Result<EntityDetail, AppError> {
        self.repository
            .find_by_id(self.kind, id)
            .await?
            .ok_or_else(|| self.entity_not_found(id))
    }

    pub async fn list_entities(&self, query: ListQuery) -> Result<Vec<EntitySummary>, AppError> {
        self.repository.list(self.kind, query).await
    }

    pub async fn count_entities(&self) -> Result<i64, AppError> {
        self.repository.count(self.kind).await
    }

    /// Rewrites every scalar field and, if files were supplied, replaces the
    /// whole attachment set in the same transaction.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the payload id is missing or differs from `id`,
    ///   or a required field is empty
    /// - [`AppError::NotFound`] if the entity does not exist
    /// - [`AppError::Conflict`] if `expected_version` is stale
    pub async fn update_entity(
        &self,
        id: i64,
        write: EntityWrite,
    ) -> Result<EntitySummary, AppError> {
        match write.id {
            None => {
                return Err(AppError::bad_request(
                    "Id is required",
                    json!({ "fields": ["id"] }),
                ));
            }
            Some(payload_id) if payload_id != id => {
                return Err(AppError::bad_request(
                    "Id in path and payload do not match",
                    json!({ "path_id": id, "payload_id": payload_id }),
                ));
            }
            Some(_) => {}
        }

        let fields = write.fields.for_kind(self.kind);
        fields.validate()?;

        let replaced = write.attachments.as_ref().map(Vec::len);
        let update = EntityUpdate {
            expected_version: write.expected_version,
            fields: Some(fields),
            attachments: write.attachments,
        };

        match self.repository.update(self.kind, id, update).await {
            Ok(updated) => {
                info!(
                    kind = %self.kind,
                    id,
                    version = updated.entity.version,
                    replaced_attachments = ?replaced,
                    "entity updated"
                );
                Ok(updated)
            }
            Err(e @ AppError::Conflict { .. }) => {
                warn!(kind = %self.kind, id, expected = ?write.expected_version, "stale update rejected");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the entity and every attachment it owns.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the entity does not exist.
    pub async fn delete_entity(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(self.kind, id).await? {
            return Err(self.entity_not_found(id));
        }

        info!(kind = %self.kind, id, "entity deleted");
        Ok(())
    }

    /// Loads one attachment owned by an entity of this kind.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown ids, including ids removed by a
    /// replace or a delete.
    pub async fn fetch_attachment(&self, attachment_id: i64) -> Result<Attachment, AppError> {
        self.blobs
            .fetch(self.kind, attachment_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Attachment not found",
                    json!({ "kind": self.kind.as_str(), "attachment_id": attachment_id }),
                )
            })
    }

    fn entity_not_found(&self, id: i64) -> AppError {
        AppError::not_found(
            format!("{} not found", self.kind.route_name()),
            json!({ "kind": self.kind.as_str(), "id": id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AttachmentMeta, ContentEntity};
    use crate::domain::repositories::{MockBlobStore, MockContentRepository};
    use chrono::Utc;

    fn valid_fields() -> EntityFields {
        EntityFields {
            name: "Portfolio Site".to_string(),
            description: "My site".to_string(),
            categories: "Fullstack".to_string(),
            technologies: vec!["React JS".to_string(), "Node JS".to_string()],
            is_tagged: true,
        }
    }

    fn summary(kind: EntityKind, id: i64, version: i64, files: &[&str]) -> EntitySummary {
        EntitySummary {
            entity: ContentEntity {
                id,
                kind,
                fields: valid_fields().for_kind(kind),
                version,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            attachments: files
                .iter()
                .enumerate()
                .map(|(i, name)| AttachmentMeta {
                    id: i as i64 + 1,
                    entity_id: id,
                    file_name: name.to_string(),
                    size_bytes: 3,
                })
                .collect(),
        }
    }

    fn service(kind: EntityKind, repo: MockContentRepository) -> EntityService {
        EntityService::new(kind, Arc::new(repo), Arc::new(MockBlobStore::new()))
    }

    #[tokio::test]
    async fn test_create_entity_success() {
        let mut repo = MockContentRepository::new();
        let created = summary(EntityKind::Project, 7, 1, &["diagram.png"]);

        repo.expect_create()
            .withf(|kind, new_entity| {
                *kind == EntityKind::Project
                    && new_entity.attachments.len() == 1
                    && new_entity.fields.technologies == ["React JS", "Node JS"]
            })
            .times(1)
            .returning(move |_, _| Ok(created.clone()));

        let service = service(EntityKind::Project, repo);
        let result = service
            .create_entity(
                valid_fields(),
                vec![NewAttachment::new("diagram.png", b"png".to_vec())],
            )
            .await
            .unwrap();

        assert_eq!(result.entity.id, 7);
        assert_eq!(result.attachments[0].content_type(), "image/png");
    }

    #[tokio::test]
    async fn test_create_entity_lists_missing_fields() {
        let mut repo = MockContentRepository::new();
        repo.expect_create().times(0);

        let service = service(EntityKind::Project, repo);
        let fields = EntityFields {
            name: "Only name".to_string(),
            ..Default::default()
        };

        let err = service.create_entity(fields, Vec::new()).await.unwrap_err();

        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details["fields"], json!(["categories", "description"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_blog_drops_project_fields() {
        let mut repo = MockContentRepository::new();
        let created = summary(EntityKind::Blog, 3, 1, &[]);

        repo.expect_create()
            .withf(|kind, new_entity| {
                *kind == EntityKind::Blog
                    && new_entity.fields.technologies.is_empty()
                    && !new_entity.fields.is_tagged
            })
            .times(1)
            .returning(move |_, _| Ok(created.clone()));

        let service = service(EntityKind::Blog, repo);
        assert!(service.create_entity(valid_fields(), Vec::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_entity_storage_failure_propagates() {
        let mut repo = MockContentRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_, _| Err(AppError::storage("Database error", json!({}))));

        let service = service(EntityKind::Project, repo);
        let result = service
            .create_entity(
                valid_fields(),
                vec![NewAttachment::new("a.png", b"a".to_vec())],
            )
            .await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_get_entity_not_found() {
        let mut repo = MockContentRepository::new();
        repo.expect_find_by_id()
            .withf(|kind, id| *kind == EntityKind::Blog && *id == 99)
            .times(1)
            .returning(|_, _| Ok(None));

        let service = service(EntityKind::Blog, repo);
        let result = service.get_entity(99).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_requires_matching_id() {
        let mut repo = MockContentRepository::new();
        repo.expect_update().times(0);
        let service = service(EntityKind::Project, repo);

        let mismatched = EntityWrite {
            id: Some(2),
            fields: valid_fields(),
            ..Default::default()
        };
        let err = service.update_entity(1, mismatched).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let missing = EntityWrite {
            id: None,
            fields: valid_fields(),
            ..Default::default()
        };
        let err = service.update_entity(1, missing).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_passes_replacement_and_version() {
        let mut repo = MockContentRepository::new();
        let updated = summary(EntityKind::Project, 1, 4, &[]);

        repo.expect_update()
            .withf(|_, id, update| {
                *id == 1
                    && update.expected_version == Some(3)
                    && update.fields.is_some()
                    && update.attachments.as_ref().is_some_and(Vec::is_empty)
            })
            .times(1)
            .returning(move |_, _, _| Ok(updated.clone()));

        let service = service(EntityKind::Project, repo);
        let write = EntityWrite {
            id: Some(1),
            fields: valid_fields(),
            attachments: Some(Vec::new()),
            expected_version: Some(3),
        };

        let result = service.update_entity(1, write).await.unwrap();
        assert!(result.attachments.is_empty());
        assert_eq!(result.entity.version, 4);
    }

    #[tokio::test]
    async fn test_update_without_files_keeps_attachments() {
        let mut repo = MockContentRepository::new();
        let updated = summary(EntityKind::Project, 1, 2, &["keep.pdf"]);

        repo.expect_update()
            .withf(|_, _, update| update.attachments.is_none())
            .times(1)
            .returning(move |_, _, _| Ok(updated.clone()));

        let service = service(EntityKind::Project, repo);
        let write = EntityWrite {
            id: Some(1),
            fields: valid_fields(),
            ..Default::default()
        };

        let result = service.update_entity(1, write).await.unwrap();
        assert_eq!(result.attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_update_conflict_propagates() {
        let mut repo = MockContentRepository::new();
        repo.expect_update()
            .times(1)
            .returning(|_, _, _| Err(AppError::conflict("stale", json!({}))));

        let service = service(EntityKind::Blog, repo);
        let write = EntityWrite {
            id: Some(5),
            fields: valid_fields(),
            expected_version: Some(1),
            ..Default::default()
        };

        let result = service.update_entity(5, write).await;
        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_entity_not_found() {
        let mut repo = MockContentRepository::new();
        repo.expect_delete().times(1).returning(|_, _| Ok(false));

        let service = service(EntityKind::Project, repo);
        let result = service.delete_entity(12).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_fetch_attachment_resolves_content_type() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_fetch()
            .withf(|kind, id| *kind == EntityKind::Project && *id == 4)
            .times(1)
            .returning(|_, _| {
                Ok(Some(Attachment {
                    meta: AttachmentMeta {
                        id: 4,
                        entity_id: 1,
                        file_name: "photo.PNG".to_string(),
                        size_bytes: 2,
                    },
                    content: b"hi".to_vec(),
                }))
            });
        blobs
            .expect_fetch()
            .withf(|_, id| *id == 5)
            .times(1)
            .returning(|_, _| Ok(None));

        let service = EntityService::new(
            EntityKind::Project,
            Arc::new(MockContentRepository::new()),
            Arc::new(blobs),
        );

        let attachment = service.fetch_attachment(4).await.unwrap();
        assert_eq!(attachment.content_type(), "image/png");
        assert_eq!(attachment.content, b"hi");

        let missing = service.fetch_attachment(5).await;
        assert!(matches!(missing, Err(AppError::NotFound { .. })));
    }
}
