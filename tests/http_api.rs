//! End-to-end HTTP tests against the router with in-memory stores.

use anime_service::{
    app, security::hash_password, Anime, AnimeStore, AppError, AppState, MemoryAnimeStore,
    MemoryUserLoginStore, Role, UserLogin,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN: (&str, &str) = ("admin", "devwall");
const USER: (&str, &str) = ("user", "devwall");
const NO_ROLES: (&str, &str) = ("guest", "devwall");

fn login(id: i32, username: &str, password: &str, roles: &[Role]) -> UserLogin {
    UserLogin {
        id,
        name: username.to_string(),
        username: username.to_string(),
        password: hash_password(password, 4).unwrap(),
        roles: roles.to_vec(),
    }
}

fn app_over(store: Arc<dyn AnimeStore>, expose_trace: bool) -> Router {
    let users = MemoryUserLoginStore::new([
        login(1, ADMIN.0, ADMIN.1, &[Role::Admin, Role::User]),
        login(2, USER.0, USER.1, &[Role::User]),
        login(3, NO_ROLES.0, NO_ROLES.1, &[]),
    ]);
    let state = AppState::new(store, Arc::new(users), expose_trace);
    app(state, 1024 * 1024)
}

fn test_app_with(expose_trace: bool) -> (Router, MemoryAnimeStore) {
    let store = MemoryAnimeStore::new();
    (app_over(Arc::new(store.clone()), expose_trace), store)
}

/// Every call fails as if the database were gone.
struct BrokenStore;

fn connection_lost() -> AppError {
    AppError::Internal("connection refused: db:5432".into())
}

#[async_trait]
impl AnimeStore for BrokenStore {
    fn find_all(&self) -> BoxStream<'_, Result<Anime, AppError>> {
        stream::once(async { Err(connection_lost()) }).boxed()
    }

    async fn find_by_id(&self, _id: i32) -> Result<Option<Anime>, AppError> {
        Err(connection_lost())
    }

    async fn save(&self, _anime: Anime) -> Result<Anime, AppError> {
        Err(connection_lost())
    }

    async fn delete(&self, _anime: &Anime) -> Result<(), AppError> {
        Err(connection_lost())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(connection_lost())
    }
}

fn test_app() -> (Router, MemoryAnimeStore) {
    test_app_with(true)
}

fn request(
    method: Method,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((username, password)) = auth {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        builder = builder.header(header::AUTHORIZATION, format!("Basic {}", encoded));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn admin(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    request(method, uri, Some(ADMIN), body)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn list_without_credentials_is_unauthorized() {
    let (app, _) = test_app();
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/animes", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_some());

    let (status, body) = send(&app, request(Method::GET, "/animes", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert_eq!(body["developerMessage"], "An AuthenticationFailed error happened");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _) = test_app();
    let wrong = request(Method::GET, "/animes", Some(("admin", "nope")), None);
    let (status, body) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn user_role_can_list_and_read() {
    let (app, store) = test_app();
    let (status, body) = send(&app, request(Method::GET, "/animes", Some(USER), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    store.save(Anime::new("Naruto")).await.unwrap();
    let (status, body) = send(&app, request(Method::GET, "/animes/1", Some(USER), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Naruto"}));
}

#[tokio::test]
async fn user_role_cannot_mutate() {
    let (app, store) = test_app();
    let cases = [
        (Method::POST, "/animes", Some(json!({"name": "Naruto"}))),
        (Method::POST, "/animes/batch", Some(json!([{"name": "Naruto"}]))),
        (Method::PUT, "/animes/1", Some(json!({"name": "Naruto"}))),
        (Method::DELETE, "/animes/1", None),
    ];
    for (method, uri, body) in cases {
        let (status, error) = send(&app, request(method.clone(), uri, Some(USER), body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(error["status"], 403);
        assert_eq!(error["developerMessage"], "A Forbidden error happened");
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn create_read_delete_round_trip() {
    let (app, _) = test_app();

    let naruto = admin(Method::POST, "/animes", Some(json!({"name": "Naruto"})));
    let (status, created) = send(&app, naruto).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Naruto");
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/animes/{}", id);
    let (status, found) = send(&app, admin(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, created);

    let (status, body) = send(&app, admin(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, error) = send(&app, admin(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["status"], 404);
    assert_eq!(error["message"], "Anime not found");
    assert_eq!(error["developerMessage"], "A NotFound error happened");
    assert_eq!(error["path"], uri);
}

#[tokio::test]
async fn create_ignores_client_id() {
    let (app, _) = test_app();
    let (status, created) = send(
        &app,
        admin(Method::POST, "/animes", Some(json!({"id": 42, "name": "Naruto"}))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
}

#[tokio::test]
async fn create_with_empty_or_missing_name_is_bad_request() {
    let (app, store) = test_app();
    for body in [json!({"name": ""}), json!({})] {
        let (status, error) = send(&app, admin(Method::POST, "/animes", Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["status"], 400);
        assert_eq!(error["message"], "name is required");
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn malformed_json_and_bad_ids_are_bad_requests() {
    let (app, _) = test_app();
    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/animes")
        .header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode("admin:devwall")))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, error) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["developerMessage"], "An InvalidArgument error happened");

    let (status, error) = send(&app, admin(Method::GET, "/animes/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["status"], 400);
}

#[tokio::test]
async fn batch_create_returns_all_records() {
    let (app, store) = test_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/animes/batch",
            Some(ADMIN),
            Some(json!([{"name": "Naruto"}, {"name": "Bleach"}])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!([{"id": 1, "name": "Naruto"}, {"id": 2, "name": "Bleach"}]));
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn batch_with_empty_name_fails_after_partial_save() {
    let (app, store) = test_app();
    let (status, error) = send(
        &app,
        request(
            Method::POST,
            "/animes/batch",
            Some(ADMIN),
            Some(json!([{"name": "Naruto"}, {"name": ""}, {"name": "Bleach"}])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["status"], 400);
    assert_eq!(error["message"], "Invalid name");
    // No rollback: records up to and including the failing one were written.
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn update_uses_path_id_and_overwrites() {
    let (app, _) = test_app();
    send(&app, admin(Method::POST, "/animes", Some(json!({"name": "Naruto"})))).await;

    let (status, body) = send(
        &app,
        admin(Method::PUT, "/animes/1", Some(json!({"id": 99, "name": "Naruto 2"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, found) = send(&app, admin(Method::GET, "/animes/1", None)).await;
    assert_eq!(found, json!({"id": 1, "name": "Naruto 2"}));
}

#[tokio::test]
async fn update_and_delete_missing_are_not_found() {
    let (app, store) = test_app();
    send(&app, admin(Method::POST, "/animes", Some(json!({"name": "Naruto"})))).await;

    let missing = admin(Method::PUT, "/animes/7", Some(json!({"name": "X"})));
    let (status, error) = send(&app, missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["status"], 404);

    let (status, error) = send(&app, admin(Method::DELETE, "/animes/7", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["developerMessage"], "A NotFound error happened");

    assert_eq!(store.len(), 1);
    let (_, found) = send(&app, admin(Method::GET, "/animes/1", None)).await;
    assert_eq!(found["name"], "Naruto");
}

#[tokio::test]
async fn trace_is_attached_only_on_request_and_when_enabled() {
    let (app, _) = test_app();
    let (_, error) = send(&app, admin(Method::GET, "/animes/5", None)).await;
    assert!(error.get("trace").is_none());

    let (_, error) = send(&app, admin(Method::GET, "/animes/5?trace=true", None)).await;
    assert!(error["trace"].as_str().unwrap().contains("NotFound"));

    let (app, _) = test_app_with(false);
    let (_, error) = send(&app, admin(Method::GET, "/animes/5?trace=true", None)).await;
    assert!(error.get("trace").is_none());
}

#[tokio::test]
async fn request_id_header_is_echoed_in_error_body() {
    let (app, _) = test_app();
    let mut req = request(Method::GET, "/animes", None, None);
    req.headers_mut().insert("x-request-id", "abc-123".parse().unwrap());
    let (_, error) = send(&app, req).await;
    assert_eq!(error["requestId"], "abc-123");
}

#[tokio::test]
async fn metadata_routes_are_public() {
    let (app, _) = test_app();
    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, request(Method::GET, "/ready", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = send(&app, request(Method::GET, "/version", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "anime-service");

    let (status, body) = send(&app, request(Method::GET, "/v3/api-docs", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/animes"].is_object());
}

#[tokio::test]
async fn unknown_routes_need_authentication_then_404() {
    let (app, _) = test_app();
    let (status, _) = send(&app, request(Method::GET, "/nowhere", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, error) = send(&app, request(Method::GET, "/nowhere", Some(USER), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["status"], 404);
}

#[tokio::test]
async fn unsupported_method_keeps_status_with_json_body() {
    let (app, _) = test_app();
    let (status, error) = send(&app, admin(Method::PATCH, "/animes/1", None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error["status"], 405);
}

#[tokio::test]
async fn form_login_checks_credentials() {
    let (app, _) = test_app();
    let form = |body: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let (status, body) = send(&app, form("username=user&password=devwall")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"username": "user", "roles": ["USER"]}));

    let (status, error) = send(&app, form("username=user&password=wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["status"], 401);
}

#[tokio::test]
async fn head_requests_follow_get_rules() {
    let (app, store) = test_app();
    store.save(Anime::new("Naruto")).await.unwrap();

    for uri in ["/animes", "/animes/1"] {
        let (status, _) = send(&app, request(Method::HEAD, uri, Some(NO_ROLES), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "HEAD {}", uri);
        let (status, _) = send(&app, request(Method::HEAD, uri, Some(USER), None)).await;
        assert_eq!(status, StatusCode::OK, "HEAD {}", uri);
    }

    let (status, _) = send(&app, request(Method::HEAD, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn roleless_user_is_forbidden_from_reads() {
    let (app, _) = test_app();
    let (status, error) = send(&app, request(Method::GET, "/animes", Some(NO_ROLES), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["message"], "Access Denied");
}

#[tokio::test]
async fn store_failures_hide_internals() {
    let app = app_over(Arc::new(BrokenStore), true);
    for uri in ["/animes", "/animes/1"] {
        let (status, error) = send(&app, admin(Method::GET, uri, None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(error["status"], 500);
        assert_eq!(error["error"], "Internal Server Error");
        assert_eq!(error["message"], "Internal server error");
        assert_eq!(error["developerMessage"], "An unexpected error happened");
        assert!(error.get("trace").is_none());
        assert!(!error.to_string().contains("db:5432"));
    }
}

#[tokio::test]
async fn ready_reports_unavailable_store() {
    let app = app_over(Arc::new(BrokenStore), true);
    let (status, error) = send(&app, request(Method::GET, "/ready", None, None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["status"], 503);
    assert_eq!(error["path"], "/ready");
    assert_eq!(error["error"], "Service Unavailable");

    let (app, _) = test_app();
    let (status, body) = send(&app, request(Method::GET, "/ready", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "database": "ok"}));
}
