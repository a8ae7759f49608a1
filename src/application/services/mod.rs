//! Business logic services for the application layer.

pub mod auth_service;
pub mod entity_service;

pub use auth_service::AuthService;
pub use entity_service::{EntityService, EntityWrite};
