//! Application layer services.
//!
//! Services validate requests and coordinate repository calls; handlers talk
//! only to services.
//!
//! # Available Services
//!
//! - [`services::entity_service::EntityService`] - Create, read, update and delete for one content kind
//! - [`services::auth_service::AuthService`] - Admin bearer-token check

pub mod services;
