//! Repository trait for content entities and their attachment sets.

use crate::domain::entities::{
    EntityDetail, EntityFields, EntityKind, EntitySummary, EntityUpdate, ListQuery,
    NewAttachment, NewEntity,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage of entities and their attachment ownership edges.
///
/// Every write is one transaction: readers observe either the state before or
/// after it, never a partially attached entity or a mixed attachment set.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgContentRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryContentStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Persists an entity and its attachments atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if any part of the write fails; nothing is
    /// left behind in that case.
    async fn create(&self, kind: EntityKind, new_entity: NewEntity)
    -> Result<EntitySummary, AppError>;

    /// Loads an entity with its full attachment content.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(detail))` if found
    /// - `Ok(None)` if no entity of this kind has the id
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend errors.
    async fn find_by_id(&self, kind: EntityKind, id: i64)
    -> Result<Option<EntityDetail>, AppError>;

    /// Lists entities of a kind with attachment metadata.
    ///
    /// Order defaults to identifier ascending; the result is finite and the same
    /// query can be repeated to restart it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend errors.
    async fn list(&self, kind: EntityKind, query: ListQuery)
    -> Result<Vec<EntitySummary>, AppError>;

    /// Counts entities of a kind.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend errors.
    async fn count(&self, kind: EntityKind) -> Result<i64, AppError>;

    /// Applies an [`EntityUpdate`] atomically.
    ///
    /// The version is incremented and the last-modified timestamp advanced even
    /// when only the attachment set changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the entity does not exist.
    /// Returns [`AppError::Conflict`] if `expected_version` is stale.
    /// Returns [`AppError::Storage`] on backend errors.
    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        update: EntityUpdate,
    ) -> Result<EntitySummary, AppError>;

    /// Removes an entity and every attachment it owns.
    ///
    /// Returns `Ok(true)` if the entity existed, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend errors.
    async fn delete(&self, kind: EntityKind, id: i64) -> Result<bool, AppError>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Overwrites the scalar fields, keeping the attachment set.
    ///
    /// # Errors
    ///
    /// Same as [`ContentRepository::update`].
    async fn update_fields(
        &self,
        kind: EntityKind,
        id: i64,
        expected_version: Option<i64>,
        fields: EntityFields,
    ) -> Result<EntitySummary, AppError> {
        let update = EntityUpdate {
            expected_version,
            fields: Some(fields),
            attachments: None,
        };
        self.update(kind, id, update).await
    }

    /// Deletes every attachment owned by the entity, then inserts `attachments`.
    ///
    /// An empty list leaves the entity with zero attachments.
    ///
    /// # Errors
    ///
    /// Same as [`ContentRepository::update`].
    async fn replace_attachments(
        &self,
        kind: EntityKind,
        id: i64,
        expected_version: Option<i64>,
        attachments: Vec<NewAttachment>,
    ) -> Result<EntitySummary, AppError> {
        let update = EntityUpdate {
            expected_version,
            fields: None,
            attachments: Some(attachments),
        };
        self.update(kind, id, update).await
    }
}
