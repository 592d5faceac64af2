// crates/rollcall-server/tests/http_api.rs
// ============================================================================
// Module: HTTP API Integration Tests
// Description: End-to-end tests against a live server on an ephemeral port.
// Purpose: Validate wire behavior the way a real client observes it.
// Dependencies: rollcall-server, rollcall-core, reqwest, tokio
// ============================================================================

//! ## Overview
//! Spins up the full router on an OS-assigned port with the in-memory
//! catalog and drives it with reqwest. Covers the admission status mapping,
//! duplicate detection, the import/list/delete resource flow, and body
//! shapes clients depend on.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use reqwest::StatusCode;
use rollcall_core::InMemoryCatalog;
use rollcall_core::SharedCatalogStore;
use rollcall_server::AppState;
use rollcall_server::NoopAuditSink;
use rollcall_server::build_router;
use rollcall_server::config::CatalogLimits;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Running test server with its base URL.
struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState {
            store: SharedCatalogStore::from_store(InMemoryCatalog::new()),
            audit: Arc::new(NoopAuditSink),
            limits: CatalogLimits::default(),
        };
        let app = build_router(state, 1024 * 1024);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base))
            .json(body)
            .send()
            .await
            .expect("request")
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(format!("{}{path}", self.base)).send().await.expect("request")
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(format!("{}{path}", self.base)).send().await.expect("request")
    }

    async fn create_student(&self, name: &str) -> i64 {
        let response = self
            .post("/students", &json!({"name": name, "email": format!("{name}@example.com")}))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("json");
        body["id"].as_i64().expect("id")
    }

    async fn create_course(&self, capacity: u32) -> i64 {
        let response =
            self.post("/courses", &json!({"title": "Course", "capacity": capacity})).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("json");
        body["id"].as_i64().expect("id")
    }

    async fn enroll(&self, student_id: i64, course_id: i64) -> reqwest::Response {
        self.post(&format!("/students/{student_id}/enroll"), &json!({"course_id": course_id}))
            .await
    }
}

// ============================================================================
// SECTION: Entity Flows
// ============================================================================

#[tokio::test]
async fn student_lifecycle_over_the_wire() {
    let server = TestServer::start().await;
    let id = server.create_student("alice").await;

    let fetched = server.get(&format!("/students/{id}")).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let body: Value = fetched.json().await.expect("json");
    assert_eq!(body["email"], "alice@example.com");

    let deleted = server.delete(&format!("/students/{id}")).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    let gone = server.get(&format!("/students/{id}")).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let body: Value = gone.json().await.expect("json");
    assert_eq!(body["error"], "student_not_found");
}

#[tokio::test]
async fn duplicate_email_returns_conflict_body() {
    let server = TestServer::start().await;
    server.create_student("alice").await;
    let response = server
        .post("/students", &json!({"name": "other", "email": "alice@example.com"}))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn course_creation_defaults_capacity() {
    let server = TestServer::start().await;
    let response = server.post("/courses", &json!({"title": "Defaulted"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["capacity"], 30);
}

#[tokio::test]
async fn teacher_deletion_detaches_courses() {
    let server = TestServer::start().await;
    let response =
        server.post("/teachers", &json!({"name": "prof", "email": "prof@example.com"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let teacher: Value = response.json().await.expect("json");
    let teacher_id = teacher["id"].as_i64().expect("id");

    let response = server
        .post("/courses", &json!({"title": "Owned", "capacity": 3, "teacher_id": teacher_id}))
        .await;
    let course: Value = response.json().await.expect("json");
    let course_id = course["id"].as_i64().expect("id");

    let deleted = server.delete(&format!("/teachers/{teacher_id}")).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let fetched = server.get(&format!("/courses/{course_id}")).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let body: Value = fetched.json().await.expect("json");
    assert_eq!(body["teacher_id"], Value::Null);
}

// ============================================================================
// SECTION: Admission Over The Wire
// ============================================================================

#[tokio::test]
async fn enrollment_status_mapping_matches_the_contract() {
    let server = TestServer::start().await;
    let s1 = server.create_student("s1").await;
    let s2 = server.create_student("s2").await;
    let s3 = server.create_student("s3").await;
    let course = server.create_course(2).await;

    let admitted = server.enroll(s1, course).await;
    assert_eq!(admitted.status(), StatusCode::CREATED);
    let body: Value = admitted.json().await.expect("json");
    assert!(body["enrollment_id"].as_i64().expect("id") > 0);

    // One seat is still free, so the duplicate kind wins over capacity.
    let duplicate = server.enroll(s1, course).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let body: Value = duplicate.json().await.expect("json");
    assert_eq!(body["error"], "already_enrolled");

    assert_eq!(server.enroll(s2, course).await.status(), StatusCode::CREATED);
    let full = server.enroll(s3, course).await;
    assert_eq!(full.status(), StatusCode::CONFLICT);
    let body: Value = full.json().await.expect("json");
    assert_eq!(body["error"], "capacity_exceeded");

    let missing_course = server.enroll(s2, 404_000).await;
    assert_eq!(missing_course.status(), StatusCode::NOT_FOUND);
    let body: Value = missing_course.json().await.expect("json");
    assert_eq!(body["error"], "course_not_found");

    let missing_student = server.enroll(404_000, course).await;
    assert_eq!(missing_student.status(), StatusCode::NOT_FOUND);
    let body: Value = missing_student.json().await.expect("json");
    assert_eq!(body["error"], "student_not_found");
}

#[tokio::test]
async fn deleting_a_student_frees_their_seat() {
    let server = TestServer::start().await;
    let s1 = server.create_student("s1").await;
    let s2 = server.create_student("s2").await;
    let course = server.create_course(1).await;

    assert_eq!(server.enroll(s1, course).await.status(), StatusCode::CREATED);
    assert_eq!(server.enroll(s2, course).await.status(), StatusCode::CONFLICT);

    assert_eq!(server.delete(&format!("/students/{s1}")).await.status(), StatusCode::OK);
    assert_eq!(server.enroll(s2, course).await.status(), StatusCode::CREATED);
}

// ============================================================================
// SECTION: Scraped Resource Flows
// ============================================================================

#[tokio::test]
async fn import_list_delete_resource_flow() {
    let server = TestServer::start().await;
    let batch = json!([
        {"title": "A", "link": "https://a", "price": "10.00"},
        {"title": "B", "link": "https://b"},
    ]);
    let imported = server.post("/import/scraped", &batch).await;
    assert_eq!(imported.status(), StatusCode::OK);
    let body: Value = imported.json().await.expect("json");
    assert_eq!(body["imported"], 2);

    // Reimporting the same links inserts nothing new.
    let again = server.post("/import/scraped", &batch).await;
    let body: Value = again.json().await.expect("json");
    assert_eq!(body["imported"], 0);

    let listed = server.get("/scraped_resources?offset=0&limit=10").await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body: Value = listed.json().await.expect("json");
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["link"], "https://a");
    let first_id = items[0]["id"].as_i64().expect("id");

    let deleted = server.delete(&format!("/scraped_resources/{first_id}")).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    let listed: Value =
        server.get("/scraped_resources").await.json().await.expect("json");
    assert_eq!(listed.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn malformed_json_body_is_a_client_error() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(format!("{}/students", server.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
