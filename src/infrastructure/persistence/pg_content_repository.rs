//! PostgreSQL implementation of the content repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

use super::pg_blob_store::{delete_blobs, load_blobs, load_metas, store_blobs};
use crate::domain::entities::{
    ContentEntity, EntityDetail, EntityFields, EntityKind, EntitySummary, EntityUpdate,
    ListOrder, ListQuery, NewEntity,
};
use crate::domain::repositories::ContentRepository;
use crate::error::AppError;

const ENTITY_COLUMNS: &str =
    "id, name, description, categories, technologies, is_tagged, version, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EntityRow {
    id: i64,
    name: String,
    description: String,
    categories: String,
    technologies: Vec<String>,
    is_tagged: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntityRow {
    fn into_entity(self, kind: EntityKind) -> ContentEntity {
        ContentEntity {
            id: self.id,
            kind,
            fields: EntityFields {
                name: self.name,
                description: self.description,
                categories: self.categories,
                technologies: self.technologies,
                is_tagged: self.is_tagged,
            },
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Aggregate attachment figures for one kind, used by the admin CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentStats {
    pub count: i64,
    pub total_bytes: i64,
}

/// PostgreSQL repository for projects and blog posts.
///
/// Writes lock the entity row with `SELECT ... FOR UPDATE`, so writers of the
/// same entity are serialised while writers of different entities never wait on
/// each other. Multi-statement reads run under `REPEATABLE READ`.
pub struct PgContentRepository {
    pool: Arc<PgPool>,
}

impl PgContentRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Counts attachments and their total size for a kind.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn attachment_stats(&self, kind: EntityKind) -> Result<AttachmentStats, AppError> {
        let (count, total_bytes): (i64, Option<i64>) = sqlx::query_as(
            r#"
            SELECT COUNT(a.id), SUM(a.size_bytes)::BIGINT
            FROM attachments a
            JOIN content_entities e ON e.id = a.entity_id
            WHERE e.kind = $1
            "#,
        )
        .bind(kind.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(AttachmentStats {
            count,
            total_bytes: total_bytes.unwrap_or(0),
        })
    }
}

fn order_clause(order: ListOrder) -> &'static str {
    match order {
        ListOrder::Inserted => "id ASC",
        ListOrder::Newest => "id DESC",
        ListOrder::Modified => "updated_at DESC, id DESC",
        ListOrder::Featured => "is_tagged DESC, id ASC",
    }
}

async fn begin_snapshot_read(conn: &mut PgConnection) -> Result<(), AppError> {
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Locks the entity row and returns its current version.
async fn lock_entity(
    conn: &mut PgConnection,
    kind: EntityKind,
    id: i64,
) -> Result<Option<i64>, AppError> {
    let version: Option<i64> = sqlx::query_scalar(
        "SELECT version FROM content_entities WHERE id = $1 AND kind = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(kind.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(version)
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn create(
        &self,
        kind: EntityKind,
        new_entity: NewEntity,
    ) -> Result<EntitySummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let fields = new_entity.fields;
        let row: EntityRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO content_entities (kind, name, description, categories, technologies, is_tagged)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ENTITY_COLUMNS}
            "#
        ))
        .bind(kind.as_str())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.categories)
        .bind(&fields.technologies)
        .bind(fields.is_tagged)
        .fetch_one(&mut *tx)
        .await?;

        let attachments = store_blobs(&mut tx, row.id, new_entity.attachments).await?;

        tx.commit().await?;

        Ok(EntitySummary {
            entity: row.into_entity(kind),
            attachments,
        })
    }

    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Option<EntityDetail>, AppError> {
        let mut tx = self.pool.begin().await?;
        begin_snapshot_read(&mut tx).await?;

        let row: Option<EntityRow> = sqlx::query_as(&format!(
            "SELECT {ENTITY_COLUMNS} FROM content_entities WHERE id = $1 AND kind = $2"
        ))
        .bind(id)
        .bind(kind.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attachments = load_blobs(&mut tx, row.id).await?;
        tx.commit().await?;

        Ok(Some(EntityDetail {
            entity: row.into_entity(kind),
            attachments,
        }))
    }

    async fn list(
        &self,
        kind: EntityKind,
        query: ListQuery,
    ) -> Result<Vec<EntitySummary>, AppError> {
        let (offset, limit) = query
            .page
            .map(|p| (p.offset, Some(p.limit)))
            .unwrap_or((0, None));

        let mut tx = self.pool.begin().await?;
        begin_snapshot_read(&mut tx).await?;

        let rows: Vec<EntityRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ENTITY_COLUMNS}
            FROM content_entities
            WHERE kind = $1
            ORDER BY {}
            LIMIT $2 OFFSET $3
            "#,
            order_clause(query.order)
        ))
        .bind(kind.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut metas = load_metas(&mut tx, &ids).await?;
        tx.commit().await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let attachments = metas.remove(&r.id).unwrap_or_default();
                EntitySummary {
                    entity: r.into_entity(kind),
                    attachments,
                }
            })
            .collect())
    }

    async fn count(&self, kind: EntityKind) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_entities WHERE kind = $1")
            .bind(kind.as_str())
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        update: EntityUpdate,
    ) -> Result<EntitySummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(current_version) = lock_entity(&mut tx, kind, id).await? else {
            return Err(AppError::not_found(
                "Entity not found",
                json!({ "kind": kind.as_str(), "id": id }),
            ));
        };

        if let Some(expected) = update.expected_version
            && expected != current_version
        {
            return Err(AppError::conflict(
                "Entity was modified by another request",
                json!({ "id": id, "expected_version": expected, "current_version": current_version }),
            ));
        }

        // updated_at must strictly advance even for writes inside the same clock tick.
        let row: EntityRow = match update.fields {
            Some(fields) => {
                let sql = format!(
                    r#"
                    UPDATE content_entities SET
                        name         = $2,
                        description  = $3,
                        categories   = $4,
                        technologies = $5,
                        is_tagged    = $6,
                        version      = version + 1,
                        updated_at   = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
                    WHERE id = $1
                    RETURNING {ENTITY_COLUMNS}
                    "#
                );
                sqlx::query_as(&sql)
                    .bind(id)
                    .bind(&fields.name)
                    .bind(&fields.description)
                    .bind(&fields.categories)
                    .bind(&fields.technologies)
                    .bind(fields.is_tagged)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    UPDATE content_entities SET
                        version    = version + 1,
                        updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
                    WHERE id = $1
                    RETURNING {ENTITY_COLUMNS}
                    "#
                );
                sqlx::query_as(&sql)
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let attachments = match update.attachments {
            Some(replacement) => {
                let removed = delete_blobs(&mut tx, id).await?;
                tracing::debug!(id, removed, "replaced attachment set");
                store_blobs(&mut tx, id, replacement).await?
            }
            None => load_metas(&mut tx, &[id])
                .await?
                .remove(&id)
                .unwrap_or_default(),
        };

        tx.commit().await?;

        Ok(EntitySummary {
            entity: row.into_entity(kind),
            attachments,
        })
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if lock_entity(&mut tx, kind, id).await?.is_none() {
            return Ok(false);
        }

        // Cascade explicitly; the FK cascade is only a backstop.
        delete_blobs(&mut tx, id).await?;

        sqlx::query("DELETE FROM content_entities WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
