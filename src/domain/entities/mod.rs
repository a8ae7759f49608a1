//! Core domain entities of the content store.
//!
//! # Entity Types
//!
//! - [`ContentEntity`] - A project or blog post (see [`EntityKind`])
//! - [`Attachment`] / [`AttachmentMeta`] - A stored binary file and its metadata
//!
//! # Write Inputs
//!
//! - [`NewEntity`], [`NewAttachment`] - For creating records
//! - [`EntityUpdate`] - For wholesale field rewrites and attachment replacement
//! - [`FieldUpdate`] - Typed single-field change applied to an [`EntityFields`] draft

pub mod attachment;
pub mod content;

pub use attachment::{Attachment, AttachmentMeta, NewAttachment, sanitize_file_name};
pub use content::{
    ContentEntity, EntityDetail, EntityFields, EntityKind, EntitySummary, EntityUpdate,
    FieldUpdate, ListOrder, ListQuery, NewEntity, Page,
};
