mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_project_with_file() {
    let server = common::make_server();

    let response = server
        .post("/api/Project")
        .add_header("Authorization", common::bearer())
        .multipart(common::with_files(
            common::entity_form("Portfolio Site").add_text("IsTagged", "true"),
            &[("diagram.png", "PNG")],
        ))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    let id = body["id"].as_i64().unwrap();
    assert_eq!(
        response.header("location").to_str().unwrap(),
        format!("/api/Project/{id}")
    );
    assert_eq!(body["name"], "Portfolio Site");
    assert_eq!(body["technologies"], json!(["React JS", "Node JS"]));
    assert_eq!(body["isTagged"], true);
    assert_eq!(body["version"], 1);
    assert_eq!(body["attachments"][0]["fileName"], "diagram.png");
    assert_eq!(body["attachments"][0]["contentType"], "image/png");
    assert!(body["attachments"][0].get("content").is_none());
}

#[tokio::test]
async fn test_create_project_lists_missing_fields() {
    let server = common::make_server();

    let form = axum_test::multipart::MultipartForm::new().add_text("Name", "Only name");
    let response = server
        .post("/api/Project")
        .add_header("Authorization", common::bearer())
        .multipart(form)
        .await;

    response.assert_status_bad_request();

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        body["error"]["details"]["fields"],
        json!(["categories", "description"])
    );

    server.get("/api/Project").await.assert_json(&json!([]));
}

#[tokio::test]
async fn test_create_requires_token() {
    let server = common::make_server();

    let response = server
        .post("/api/Project")
        .multipart(common::entity_form("No token"))
        .await;
    response.assert_status_unauthorized();
    assert_eq!(response.header("www-authenticate"), "Bearer");

    let response = server
        .post("/api/Project")
        .add_header("Authorization", "Bearer wrong-token")
        .multipart(common::entity_form("Bad token"))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_create_over_upload_limit() {
    let server = common::make_server_with_body_limit(2048);
    let large = vec![b'x'; 10 * 1024];

    let response = server
        .post("/api/Project")
        .add_header("Authorization", common::bearer())
        .multipart(
            common::entity_form("Too big").add_part("Files", common::file_part("big.bin", &large)),
        )
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["error"]["code"], "payload_too_large");

    server.get("/api/Project").await.assert_json(&json!([]));
}

// ─── READ ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_project_includes_content() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[("notes.txt", "hello")]).await;
    let id = created["id"].as_i64().unwrap();

    let response = server.get(&format!("/api/Project/{id}")).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["attachments"][0]["content"], "aGVsbG8=");
    assert_eq!(body["attachments"][0]["size"], 5);
    assert_eq!(body["attachments"][0]["contentType"], "text/plain");
}

#[tokio::test]
async fn test_get_project_not_found() {
    let server = common::make_server();

    let response = server.get("/api/Project/999").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_list_projects_order_and_cover() {
    let server = common::make_server();
    common::create_entity(&server, "Project", "First", &[("cover.jpg", "j"), ("cv.pdf", "p")])
        .await;
    common::create_entity(&server, "Project", "Second", &[]).await;

    let body = server.get("/api/Project").await.json::<Value>();
    assert_eq!(body[0]["name"], "First");
    assert_eq!(body[0]["attachmentCount"], 2);
    assert_eq!(body[0]["cover"]["fileName"], "cover.jpg");
    assert_eq!(body[1]["name"], "Second");
    assert_eq!(body[1]["cover"], Value::Null);

    let newest = server
        .get("/api/Project")
        .add_query_param("order", "newest")
        .await
        .json::<Value>();
    assert_eq!(newest[0]["name"], "Second");

    let paged = server
        .get("/api/Project")
        .add_query_param("page", 2)
        .add_query_param("page_size", 1)
        .await
        .json::<Value>();
    assert_eq!(paged.as_array().unwrap().len(), 1);
    assert_eq!(paged[0]["name"], "Second");
}

#[tokio::test]
async fn test_list_rejects_page_zero() {
    let server = common::make_server();

    server
        .get("/api/Project")
        .add_query_param("page", 0)
        .await
        .assert_status_bad_request();
}

// ─── UPDATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_without_files_keeps_attachments() {
    let server = common::make_server();
    let created =
        common::create_entity(&server, "Project", "Site", &[("diagram.png", "png")]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(id, "Renamed"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["version"], 2);
    assert_eq!(
        common::attachment_ids(&body),
        common::attachment_ids(&created)
    );
}

#[tokio::test]
async fn test_update_rewrites_fields_wholesale() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    let form = axum_test::multipart::MultipartForm::new()
        .add_text("Id", id)
        .add_text("Name", "Site")
        .add_text("Description", "New description")
        .add_text("Categories", "Backend");

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(form)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(body["categories"], "Backend");
    assert_eq!(body["technologies"], json!([]));
    assert_eq!(body["isTagged"], false);
}

#[tokio::test]
async fn test_update_with_empty_files_clears_attachments() {
    let server = common::make_server();
    let created =
        common::create_entity(&server, "Project", "Site", &[("diagram.png", "png")]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(id, "Site").add_part("Files", common::empty_file_part()))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(body["attachments"], json!([]));
}

#[tokio::test]
async fn test_update_keep_attachments_flag() {
    let server = common::make_server();
    let created =
        common::create_entity(&server, "Project", "Site", &[("diagram.png", "png")]).await;
    let id = created["id"].as_i64().unwrap();

    let form = common::update_form(id, "Site")
        .add_text("KeepAttachments", "true")
        .add_part("Files", common::empty_file_part());

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(form)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(
        common::attachment_ids(&body),
        common::attachment_ids(&created)
    );
}

#[tokio::test]
async fn test_update_id_mismatch() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(id + 1, "Site"))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<Value>();
    assert_eq!(body["error"]["details"]["payload_id"], id + 1);

    let unchanged = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(unchanged["version"], 1);
}

#[tokio::test]
async fn test_update_missing_payload_id() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::entity_form("Site"))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_update_not_found() {
    let server = common::make_server();

    server
        .put("/api/Project/404")
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(404, "Ghost"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_with_stale_version_conflicts() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(id, "First").add_text("Version", 1))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(id, "Second").add_text("Version", 1))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["details"]["current_version"], 2);

    let stored = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(stored["name"], "First");
}

#[tokio::test]
async fn test_update_advances_date_modified() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(common::update_form(id, "Site"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    let before: DateTime<Utc> = serde_json::from_value(created["dateModified"].clone()).unwrap();
    let after: DateTime<Utc> = serde_json::from_value(body["dateModified"].clone()).unwrap();
    assert!(after > before);
    assert_eq!(body["dateAdded"], created["dateAdded"]);
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_project() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/Project/{id}"))
        .await
        .assert_status_not_found();

    // Second delete returns 404.
    server
        .delete(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_requires_token() {
    let server = common::make_server();
    let created = common::create_entity(&server, "Project", "Site", &[]).await;
    let id = created["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/Project/{id}"))
        .await
        .assert_status_unauthorized();

    server
        .get(&format!("/api/Project/{id}"))
        .await
        .assert_status_ok();
}

// ─── SCENARIO ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_portfolio_site_lifecycle() {
    let server = common::make_server();

    let created =
        common::create_entity(&server, "Project", "Portfolio Site", &[("diagram.png", "png")])
            .await;
    let id = created["id"].as_i64().unwrap();
    let attachment_id = common::attachment_ids(&created)[0];

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(body["technologies"], json!(["React JS", "Node JS"]));
    assert_eq!(body["attachments"].as_array().unwrap().len(), 1);
    assert_eq!(body["attachments"][0]["fileName"], "diagram.png");
    assert_eq!(body["attachments"][0]["contentType"], "image/png");

    server
        .put(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .multipart(
            common::update_form(id, "Portfolio Site").add_part("Files", common::empty_file_part()),
        )
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body = server.get(&format!("/api/Project/{id}")).await.json::<Value>();
    assert_eq!(body["attachments"], json!([]));
    server
        .get(&format!("/api/Project/attachments/{attachment_id}"))
        .await
        .assert_status_not_found();

    server
        .delete(&format!("/api/Project/{id}"))
        .add_header("Authorization", common::bearer())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/Project/{id}"))
        .await
        .assert_status_not_found();
}
