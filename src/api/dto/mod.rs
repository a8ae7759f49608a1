//! Data Transfer Objects for API requests and responses.
//!
//! Responses serialize with camelCase keys. Write requests arrive as multipart
//! forms and are parsed in [`entity_form`].

pub mod entity;
pub mod entity_form;
pub mod health;
pub mod list_params;
