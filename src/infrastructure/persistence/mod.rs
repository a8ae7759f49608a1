//! Content store implementations.
//!
//! # Backends
//!
//! - [`PgContentRepository`] / [`PgBlobStore`] - PostgreSQL via SQLx, one explicit
//!   transaction per write
//! - [`MemoryContentStore`] - in-process arena implementing both traits; used when no
//!   database is configured and by the HTTP test-suite

pub mod memory_store;
pub mod pg_blob_store;
pub mod pg_content_repository;

pub use memory_store::MemoryContentStore;
pub use pg_blob_store::PgBlobStore;
pub use pg_content_repository::PgContentRepository;
