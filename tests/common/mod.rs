#![allow(dead_code)]

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode, routing::get};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use portfolio_content::api::handlers::health_handler;
use portfolio_content::api::routes::entity_routes;
use portfolio_content::application::services::AuthService;
use portfolio_content::application::services::auth_service::hash_token;
use portfolio_content::infrastructure::persistence::MemoryContentStore;
use portfolio_content::state::AppState;
use serde_json::Value;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn create_test_state() -> AppState {
    let store = Arc::new(MemoryContentStore::new());
    let auth_service = Arc::new(
        AuthService::new(TEST_SECRET.to_string(), &hash_token(TEST_SECRET, ADMIN_TOKEN)).unwrap(),
    );

    AppState::new(store.clone(), store, auth_service, "memory")
}

/// Both kinds plus health, without rate limiting (no peer address in tests).
pub fn make_server() -> TestServer {
    TestServer::new(make_router()).unwrap()
}

/// Same routes with the upload body limit applied.
pub fn make_server_with_body_limit(max_bytes: usize) -> TestServer {
    TestServer::new(make_router().layer(DefaultBodyLimit::max(max_bytes))).unwrap()
}

fn make_router() -> Router {
    let state = create_test_state();

    Router::new()
        .route("/health", get(health_handler))
        .nest(
            "/api/Project",
            entity_routes(state.projects.clone(), state.auth_service.clone()),
        )
        .nest(
            "/api/Blog",
            entity_routes(state.blogs.clone(), state.auth_service.clone()),
        )
        .with_state(state)
}

pub fn bearer() -> String {
    format!("Bearer {ADMIN_TOKEN}")
}

pub fn entity_form(name: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("Name", name)
        .add_text("Description", "Personal portfolio built from scratch")
        .add_text("Categories", "Fullstack")
        .add_text("Technologies", "React JS,Node JS")
}

pub fn file_part(file_name: &str, content: &[u8]) -> Part {
    Part::bytes(content.to_vec())
        .file_name(file_name)
        .mime_type("application/octet-stream")
}

/// What a browser sends for a file input with nothing selected.
pub fn empty_file_part() -> Part {
    Part::bytes(Vec::<u8>::new())
        .file_name("")
        .mime_type("application/octet-stream")
}

pub fn with_files(mut form: MultipartForm, files: &[(&str, &str)]) -> MultipartForm {
    for (name, content) in files {
        form = form.add_part("Files", file_part(name, content.as_bytes()));
    }
    form
}

/// Creates an entity through the API and returns the response body.
pub async fn create_entity(
    server: &TestServer,
    route: &str,
    name: &str,
    files: &[(&str, &str)],
) -> Value {
    let response = server
        .post(&format!("/api/{route}"))
        .add_header("Authorization", bearer())
        .multipart(with_files(entity_form(name), files))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

/// Update form for an existing entity: the create fields plus `Id`.
pub fn update_form(id: i64, name: &str) -> MultipartForm {
    entity_form(name).add_text("Id", id)
}

pub fn attachment_ids(entity: &Value) -> Vec<i64> {
    entity["attachments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect()
}
