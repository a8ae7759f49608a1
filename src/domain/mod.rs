//! Domain layer containing the content model and storage contracts.
//!
//! Nothing in here knows about HTTP or PostgreSQL.
//!
//! # Architecture
//!
//! - [`entities`] - Content entities, attachments and write inputs
//! - [`content_type`] - Filename-extension to MIME type mapping
//! - [`repositories`] - Storage trait definitions
//!
//! # Ownership Model
//!
//! Attachments live in a single store keyed by id. An entity refers to its
//! attachments by id list; each attachment keeps a back-reference to exactly one
//! owner. Attachments are only ever created or removed as part of an entity
//! write (create, full update, delete), inside the same transaction.

pub mod content_type;
pub mod entities;
pub mod repositories;
