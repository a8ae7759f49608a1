//! In-process content store.
//!
//! Entities and blobs live in one arena guarded by a single lock, so every
//! write is trivially atomic and readers see either the old or the new state.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{
    Attachment, AttachmentMeta, ContentEntity, EntityDetail, EntityKind, EntitySummary,
    EntityUpdate, ListOrder, ListQuery, NewAttachment, NewEntity,
};
use crate::domain::repositories::{BlobStore, ContentRepository};
use crate::error::AppError;

/// Entity row plus the ordered ids of the attachments it owns.
#[derive(Debug, Clone)]
struct EntityRecord {
    entity: ContentEntity,
    attachment_ids: Vec<i64>,
}

/// Attachment storage keyed by id; each blob carries its owner back-reference.
#[derive(Debug, Default)]
struct BlobArena {
    blobs: HashMap<i64, Attachment>,
    last_id: i64,
}

impl BlobArena {
    fn store(&mut self, owner: i64, staged: NewAttachment) -> AttachmentMeta {
        self.last_id += 1;
        let meta = AttachmentMeta {
            id: self.last_id,
            entity_id: owner,
            file_name: staged.file_name,
            size_bytes: staged.content.len() as i64,
        };
        self.blobs.insert(
            meta.id,
            Attachment {
                meta: meta.clone(),
                content: staged.content,
            },
        );
        meta
    }

    fn fetch(&self, id: i64) -> Option<&Attachment> {
        self.blobs.get(&id)
    }

    fn delete(&mut self, id: i64) -> Option<Attachment> {
        self.blobs.remove(&id)
    }
}

#[derive(Debug, Default)]
struct Arena {
    entities: BTreeMap<i64, EntityRecord>,
    blobs: BlobArena,
    last_entity_id: i64,
}

impl Arena {
    fn record(&self, kind: EntityKind, id: i64) -> Option<&EntityRecord> {
        self.entities.get(&id).filter(|r| r.entity.kind == kind)
    }

    fn metas(&self, record: &EntityRecord) -> Vec<AttachmentMeta> {
        record
            .attachment_ids
            .iter()
            .filter_map(|id| self.blobs.fetch(*id))
            .map(|a| a.meta.clone())
            .collect()
    }

    fn summary(&self, record: &EntityRecord) -> EntitySummary {
        EntitySummary {
            entity: record.entity.clone(),
            attachments: self.metas(record),
        }
    }

    fn store_all(&mut self, owner: i64, staged: Vec<NewAttachment>) -> Vec<i64> {
        staged
            .into_iter()
            .map(|a| self.blobs.store(owner, a).id)
            .collect()
    }

    fn delete_all(&mut self, ids: &[i64]) {
        for id in ids {
            self.blobs.delete(*id);
        }
    }
}

/// Next last-modified value: now, but never earlier than one microsecond past `previous`.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let floor = previous + TimeDelta::microseconds(1);
    if now > floor { now } else { floor }
}

/// Content store kept entirely in memory.
///
/// Used when no database is configured and by the HTTP tests. Data does not
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    arena: RwLock<Arena>,
}

impl MemoryContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using in-memory content store");
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for MemoryContentStore {
    async fn create(
        &self,
        kind: EntityKind,
        new_entity: NewEntity,
    ) -> Result<EntitySummary, AppError> {
        let mut arena = self.arena.write().await;

        arena.last_entity_id += 1;
        let id = arena.last_entity_id;
        let now = Utc::now();

        let attachment_ids = arena.store_all(id, new_entity.attachments);
        let record = EntityRecord {
            entity: ContentEntity {
                id,
                kind,
                fields: new_entity.fields,
                version: 1,
                created_at: now,
                updated_at: now,
            },
            attachment_ids,
        };

        let summary = arena.summary(&record);
        arena.entities.insert(id, record);
        Ok(summary)
    }

    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Option<EntityDetail>, AppError> {
        let arena = self.arena.read().await;

        Ok(arena.record(kind, id).map(|record| EntityDetail {
            entity: record.entity.clone(),
            attachments: record
                .attachment_ids
                .iter()
                .filter_map(|a| arena.blobs.fetch(*a).cloned())
                .collect(),
        }))
    }

    async fn list(
        &self,
        kind: EntityKind,
        query: ListQuery,
    ) -> Result<Vec<EntitySummary>, AppError> {
        let arena = self.arena.read().await;

        let mut records: Vec<&EntityRecord> = arena
            .entities
            .values()
            .filter(|r| r.entity.kind == kind)
            .collect();

        match query.order {
            ListOrder::Inserted => {}
            ListOrder::Newest => records.reverse(),
            ListOrder::Modified => records.sort_by(|a, b| {
                b.entity
                    .updated_at
                    .cmp(&a.entity.updated_at)
                    .then(b.entity.id.cmp(&a.entity.id))
            }),
            ListOrder::Featured => {
                records.sort_by_key(|r| (!r.entity.fields.is_tagged, r.entity.id));
            }
        }

        let (offset, limit) = query
            .page
            .map(|p| (p.offset.max(0) as usize, p.limit.max(0) as usize))
            .unwrap_or((0, usize::MAX));

        Ok(records
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| arena.summary(r))
            .collect())
    }

    async fn count(&self, kind: EntityKind) -> Result<i64, AppError> {
        let arena = self.arena.read().await;
        Ok(arena
            .entities
            .values()
            .filter(|r| r.entity.kind == kind)
            .count() as i64)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        update: EntityUpdate,
    ) -> Result<EntitySummary, AppError> {
        let mut arena = self.arena.write().await;

        let Some(current) = arena.record(kind, id).cloned() else {
            return Err(AppError::not_found(
                "Entity not found",
                json!({ "kind": kind.as_str(), "id": id }),
            ));
        };

        if let Some(expected) = update.expected_version
            && expected != current.entity.version
        {
            return Err(AppError::conflict(
                "Entity was modified by another request",
                json!({
                    "id": id,
                    "expected_version": expected,
                    "current_version": current.entity.version
                }),
            ));
        }

        let mut record = current;
        if let Some(fields) = update.fields {
            record.entity.fields = fields;
        }
        if let Some(replacement) = update.attachments {
            arena.delete_all(&record.attachment_ids);
            record.attachment_ids = arena.store_all(id, replacement);
        }
        record.entity.version += 1;
        record.entity.updated_at = advance(record.entity.updated_at);

        let summary = arena.summary(&record);
        arena.entities.insert(id, record);
        Ok(summary)
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<bool, AppError> {
        let mut arena = self.arena.write().await;

        let Some(record) = arena.record(kind, id).cloned() else {
            return Ok(false);
        };

        arena.delete_all(&record.attachment_ids);
        arena.entities.remove(&id);
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl BlobStore for MemoryContentStore {
    async fn fetch(&self, kind: EntityKind, id: i64) -> Result<Option<Attachment>, AppError> {
        let arena = self.arena.read().await;

        let Some(blob) = arena.blobs.fetch(id) else {
            return Ok(None);
        };

        if arena.record(kind, blob.meta.entity_id).is_none() {
            return Ok(None);
        }

        Ok(Some(blob.clone()))
    }
}
