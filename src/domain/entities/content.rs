//! Content entity (project or blog post) and its write inputs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::attachment::{Attachment, AttachmentMeta, NewAttachment};

/// The two publishable kinds. They share one state machine and storage layout;
/// only projects carry technology tags and the featured flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Blog,
}

impl EntityKind {
    /// Storage discriminator, as written to the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Blog => "blog",
        }
    }

    /// Route segment the kind is served under.
    pub fn route_name(&self) -> &'static str {
        match self {
            EntityKind::Project => "Project",
            EntityKind::Blog => "Blog",
        }
    }

    pub fn has_project_fields(&self) -> bool {
        matches!(self, EntityKind::Project)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" | "projects" => Ok(EntityKind::Project),
            "blog" | "blogs" => Ok(EntityKind::Blog),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Scalar fields of an entity. Replaced wholesale on update, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct EntityFields {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Categories is required"))]
    pub categories: String,
    /// Project only.
    pub technologies: Vec<String>,
    /// Project only: the "featured" flag.
    pub is_tagged: bool,
}

impl EntityFields {
    /// Applies one typed field change to this draft.
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Name(v) => self.name = v.trim().to_string(),
            FieldUpdate::Description(v) => self.description = v.trim().to_string(),
            FieldUpdate::Categories(v) => self.categories = v.trim().to_string(),
            FieldUpdate::Technologies(list) => self.technologies.extend(
                list.into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            ),
            FieldUpdate::Tagged(flag) => self.is_tagged = flag,
        }
    }

    /// Drops the project-only fields when the kind does not carry them.
    pub fn for_kind(mut self, kind: EntityKind) -> Self {
        if !kind.has_project_fields() {
            self.technologies.clear();
            self.is_tagged = false;
        }
        self
    }
}

/// A single typed change to an [`EntityFields`] draft.
///
/// Inbound form parts are translated into these so every field route is
/// checked at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Name(String),
    Description(String),
    Categories(String),
    /// Appends to the technology list; a request may spread it over several parts.
    Technologies(Vec<String>),
    Tagged(bool),
}

impl FieldUpdate {
    /// Splits a comma-joined technology string (`"React JS, Node JS"`).
    pub fn technologies_from_str(raw: &str) -> Self {
        FieldUpdate::Technologies(raw.split(',').map(str::to_string).collect())
    }
}

/// A persisted project or blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    pub id: i64,
    pub kind: EntityKind,
    pub fields: EntityFields,
    /// Row version used for optimistic concurrency; bumped on every mutation.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entity with attachment metadata, as returned by list/create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub entity: ContentEntity,
    pub attachments: Vec<AttachmentMeta>,
}

impl EntitySummary {
    /// First attachment, used as the preview image in listings.
    pub fn cover(&self) -> Option<&AttachmentMeta> {
        self.attachments.first()
    }

    pub fn attachment_ids(&self) -> Vec<i64> {
        self.attachments.iter().map(|a| a.id).collect()
    }
}

/// Entity with full attachment content, read as one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetail {
    pub entity: ContentEntity,
    pub attachments: Vec<Attachment>,
}

/// Input for creating an entity together with its attachments.
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub fields: EntityFields,
    pub attachments: Vec<NewAttachment>,
}

/// Input for updating an entity.
///
/// - `expected_version: Some(v)` fails with a conflict unless the stored version is `v`
/// - `fields: Some(..)` rewrites every scalar field
/// - `attachments: Some(list)` replaces the whole attachment set (an empty list clears it);
///   `None` leaves it untouched
#[derive(Debug, Clone, Default)]
pub struct EntityUpdate {
    pub expected_version: Option<i64>,
    pub fields: Option<EntityFields>,
    pub attachments: Option<Vec<NewAttachment>>,
}

/// Display order for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    /// Identifier ascending (insertion order).
    #[default]
    Inserted,
    /// Identifier descending.
    Newest,
    /// Last-modified descending.
    Modified,
    /// Featured projects first, then identifier ascending.
    Featured,
}

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub order: ListOrder,
    pub page: Option<Page>,
}
