//! PostgreSQL blob storage for attachment content.
//!
//! Reads go through [`PgBlobStore`]. Writes are free functions taking an open
//! connection so they always run inside the caller's entity transaction.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{Attachment, AttachmentMeta, EntityKind, NewAttachment};
use crate::domain::repositories::BlobStore;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct AttachmentMetaRow {
    id: i64,
    entity_id: i64,
    file_name: String,
    size_bytes: i64,
}

impl From<AttachmentMetaRow> for AttachmentMeta {
    fn from(r: AttachmentMetaRow) -> Self {
        AttachmentMeta {
            id: r.id,
            entity_id: r.entity_id,
            file_name: r.file_name,
            size_bytes: r.size_bytes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AttachmentRow {
    id: i64,
    entity_id: i64,
    file_name: String,
    size_bytes: i64,
    content: Vec<u8>,
}

impl From<AttachmentRow> for Attachment {
    fn from(r: AttachmentRow) -> Self {
        Attachment {
            meta: AttachmentMeta {
                id: r.id,
                entity_id: r.entity_id,
                file_name: r.file_name,
                size_bytes: r.size_bytes,
            },
            content: r.content,
        }
    }
}

/// PostgreSQL blob store backed by the `attachments.content` column.
///
/// Content is stored and returned byte-exact; no size limit is applied here.
pub struct PgBlobStore {
    pool: Arc<PgPool>,
}

impl PgBlobStore {
    /// Creates a new blob store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn fetch(&self, kind: EntityKind, id: i64) -> Result<Option<Attachment>, AppError> {
        let row: Option<AttachmentRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.entity_id, a.file_name, a.size_bytes, a.content
            FROM attachments a
            JOIN content_entities e ON e.id = a.entity_id
            WHERE a.id = $1 AND e.kind = $2
            "#,
        )
        .bind(id)
        .bind(kind.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Attachment::from))
    }
}

/// Inserts staged attachments for `entity_id`, preserving their order.
pub(crate) async fn store_blobs(
    conn: &mut PgConnection,
    entity_id: i64,
    attachments: Vec<NewAttachment>,
) -> Result<Vec<AttachmentMeta>, AppError> {
    let mut stored = Vec::with_capacity(attachments.len());

    for (position, attachment) in attachments.into_iter().enumerate() {
        let size_bytes = attachment.size_bytes();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO attachments (entity_id, position, file_name, content, size_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entity_id)
        .bind(position as i32)
        .bind(&attachment.file_name)
        .bind(attachment.content.as_slice())
        .bind(size_bytes)
        .fetch_one(&mut *conn)
        .await?;

        stored.push(AttachmentMeta {
            id,
            entity_id,
            file_name: attachment.file_name,
            size_bytes,
        });
    }

    Ok(stored)
}

/// Deletes every attachment owned by `entity_id`. Returns the number removed.
pub(crate) async fn delete_blobs(conn: &mut PgConnection, entity_id: i64) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM attachments WHERE entity_id = $1")
        .bind(entity_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Loads attachment metadata for several owners, grouped by owner id.
pub(crate) async fn load_metas(
    conn: &mut PgConnection,
    entity_ids: &[i64],
) -> Result<HashMap<i64, Vec<AttachmentMeta>>, AppError> {
    let rows: Vec<AttachmentMetaRow> = sqlx::query_as(
        r#"
        SELECT id, entity_id, file_name, size_bytes
        FROM attachments
        WHERE entity_id = ANY($1)
        ORDER BY entity_id, position, id
        "#,
    )
    .bind(entity_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<i64, Vec<AttachmentMeta>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.entity_id)
            .or_default()
            .push(AttachmentMeta::from(row));
    }

    Ok(grouped)
}

/// Loads every attachment of one owner with content, in stored order.
pub(crate) async fn load_blobs(
    conn: &mut PgConnection,
    entity_id: i64,
) -> Result<Vec<Attachment>, AppError> {
    let rows: Vec<AttachmentRow> = sqlx::query_as(
        r#"
        SELECT id, entity_id, file_name, size_bytes, content
        FROM attachments
        WHERE entity_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(entity_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Attachment::from).collect())
}
