//! Storage trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Contracts
//!
//! - [`ContentRepository`] - Entities and their attachment sets, written transactionally
//! - [`BlobStore`] - Read access to stored attachment bytes
//!
//! # Testing
//!
//! See `tests/repository_content.rs` (PostgreSQL via `#[sqlx::test]`) and the
//! unit tests of `MemoryContentStore`.

pub mod blob_store;
pub mod content_repository;

pub use blob_store::BlobStore;
pub use content_repository::ContentRepository;

#[cfg(test)]
pub use blob_store::MockBlobStore;
#[cfg(test)]
pub use content_repository::MockContentRepository;
