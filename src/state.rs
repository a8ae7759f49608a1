//! Shared application state.

use std::sync::Arc;

use crate::application::services::{AuthService, EntityService};
use crate::domain::entities::EntityKind;
use crate::domain::repositories::{BlobStore, ContentRepository};

/// Services and storage handles shared by every request.
///
/// Cloning is cheap; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<EntityService>,
    pub blogs: Arc<EntityService>,
    pub auth_service: Arc<AuthService>,
    pub repository: Arc<dyn ContentRepository>,
    /// Storage backend name reported by the health check.
    pub backend: &'static str,
}

impl AppState {
    /// Builds the per-kind services on top of one storage backend.
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        blobs: Arc<dyn BlobStore>,
        auth_service: Arc<AuthService>,
        backend: &'static str,
    ) -> Self {
        let service =
            |kind| Arc::new(EntityService::new(kind, repository.clone(), blobs.clone()));

        Self {
            projects: service(EntityKind::Project),
            blogs: service(EntityKind::Blog),
            auth_service,
            repository,
            backend,
        }
    }

    /// Service handling `kind`.
    pub fn service(&self, kind: EntityKind) -> Arc<EntityService> {
        match kind {
            EntityKind::Project => self.projects.clone(),
            EntityKind::Blog => self.blogs.clone(),
        }
    }
}
