//! Read side of the attachment blob store.

use crate::domain::entities::{Attachment, EntityKind};
use crate::error::AppError;
use async_trait::async_trait;

/// Opaque, byte-exact storage of attachment content keyed by attachment id.
///
/// Only reads are exposed here. Storing and deleting blobs happens inside the
/// entity write transaction of a [`super::ContentRepository`] implementation, so
/// a blob can never exist without its owner.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBlobStore`] - PostgreSQL `BYTEA` storage
/// - [`crate::infrastructure::persistence::MemoryContentStore`] - in-process arena
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetches an attachment whose owner is of the given kind.
    ///
    /// An attachment owned by an entity of another kind is reported as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend errors.
    async fn fetch(&self, kind: EntityKind, id: i64) -> Result<Option<Attachment>, AppError>;
}
