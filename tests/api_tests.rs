//! HTTP 层集成测试
//!
//! 每个测试都基于一个全新的内存存储构建完整路由，
//! 通过 `tower::ServiceExt::oneshot` 直接驱动 Router。

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use user_store_api::{build_router, AppState, UserStore};

struct TestApp {
    router: Router,
    store: Arc<UserStore>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(UserStore::new());
        let router = build_router(AppState::new(store.clone()), Duration::from_secs(5));
        Self { router, store }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&body.to_string())).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(&body.to_string())).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}

#[tokio::test]
async fn test_duplicate_email_on_create() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/users", json!({"name": "Ann", "email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["age"], Value::Null);
    assert!(body.get("created_at").is_some());
    assert!(body.get("updated_at").is_none());

    let (status, body) = app
        .post("/users", json!({"name": "Bo", "email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");
    assert_eq!(body["code"], 400);

    let (status, body) = app.get("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_keeps_identity() {
    let app = TestApp::new();

    let (_, created) = app
        .post("/users", json!({"name": "Ann", "email": "a@x.com", "age": 30}))
        .await;

    let (status, updated) = app
        .put("/users/1", json!({"name": "Ann2", "email": "a2@x.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Ann2");
    assert_eq!(updated["email"], "a2@x.com");
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_eq!(updated["age"], Value::Null);
    assert!(updated["updated_at"].is_string());

    let (status, fetched) = app.get("/users/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = TestApp::new();

    let (status, body) = app.get("/users/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_create_missing_name() {
    let app = TestApp::new();

    let (status, body) = app.post("/users", json!({"email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: name");
    assert_eq!(app.store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_delete_echoes_and_ids_not_reused() {
    let app = TestApp::new();

    let (_, created) = app
        .post("/users", json!({"name": "Ann", "email": "a@x.com"}))
        .await;

    let (status, body) = app.delete("/users/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["deleted_user"], created);

    let (status, _) = app.get("/users/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .put("/users/1", json!({"name": "Ann", "email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete("/users/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/users", json!({"name": "Bo", "email": "b@x.com"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 2);
}

#[tokio::test]
async fn test_update_error_precedence() {
    let app = TestApp::new();
    app.post("/users", json!({"name": "Ann", "email": "a@x.com"}))
        .await;
    app.post("/users", json!({"name": "Bo", "email": "b@x.com"}))
        .await;

    // 不存在优先于校验错误
    let (status, body) = app.put("/users/42", json!({"email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    // 校验错误优先于邮箱重复
    let (status, body) = app
        .put("/users/2", json!({"name": "", "email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: name");

    let (status, body) = app
        .put("/users/2", json!({"name": "Bo", "email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    // 失败的更新不改变记录
    let (_, bo) = app.get("/users/2").await;
    assert_eq!(bo["email"], "b@x.com");
    assert!(bo.get("updated_at").is_none());
}

#[tokio::test]
async fn test_malformed_bodies_are_validation_errors() {
    let app = TestApp::new();

    for body in ["", "not json", "{}", "[]", "{\"name\": \"Ann\""] {
        let (status, value) = app.send(Method::POST, "/users", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", body);
        assert_eq!(value["error"], "No data provided");
    }

    let (status, value) = app
        .post("/users", json!({"name": "Ann", "email": 7}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "Invalid field: email must be a string");

    let (status, _) = app.get("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_age_stored_verbatim() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/users",
            json!({"name": "Ann", "email": "a@x.com", "age": {"years": 30}}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["age"], json!({"years": 30}));
}

#[tokio::test]
async fn test_welcome_and_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["users"], "/users");
    assert_eq!(body["endpoints"]["delete_user"], "DELETE /users/<id>");

    app.post("/users", json!({"name": "Ann", "email": "a@x.com"}))
        .await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["total_users"], 1);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_and_bad_method() {
    let app = TestApp::new();

    let (status, body) = app.get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");

    let (status, body) = app.get("/users/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");

    let (status, body) = app.get("/users/-1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");

    let (status, body) = app.delete("/users").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");

    let (status, body) = app.post("/users/1", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], 405);
}

#[tokio::test]
async fn test_request_id_header() {
    let app = TestApp::new();

    let request = Request::get("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_bad_id_is_not_found_for_every_method() {
    let app = TestApp::new();

    let (status, body) = app.post("/users/abc", json!({"name": "Ann"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");

    let (status, body) = app.send(Method::PATCH, "/users/-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");

    // 合法 ID 配不支持的方法仍然是 405
    let (status, body) = app.send(Method::PATCH, "/users/1", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_invalid_utf8_id_is_json_not_found() {
    let app = TestApp::new();

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let (status, body) = app.send(method.clone(), "/users/%FF", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "method: {}", method);
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["code"], 404);
    }
}

#[tokio::test]
async fn test_oversized_body_is_json_error() {
    let app = TestApp::new();

    let big = format!(
        "{{\"name\": \"Ann\", \"email\": \"a@x.com\", \"age\": \"{}\"}}",
        "x".repeat(3 * 1024 * 1024)
    );

    let (status, body) = app.send(Method::POST, "/users", Some(&big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request body too large");
    assert_eq!(body["code"], 413);

    app.post("/users", json!({"name": "Ann", "email": "a@x.com"}))
        .await;
    let (status, body) = app.send(Method::PUT, "/users/1", Some(&big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], 413);

    assert_eq!(app.store.count().unwrap(), 1);
    let (_, user) = app.get("/users/1").await;
    assert!(user.get("updated_at").is_none());
}
