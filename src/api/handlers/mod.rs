//! HTTP request handlers for API endpoints.
//!
//! Entity handlers take the [`EntityService`](crate::application::services::EntityService)
//! of the kind they are mounted under as state.

pub mod attachments;
pub mod entities;
pub mod health;

pub use attachments::attachment_handler;
pub use entities::{
    create_entity_handler, delete_entity_handler, get_entity_handler, list_entities_handler,
    update_entity_handler,
};
pub use health::health_handler;
