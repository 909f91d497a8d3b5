//! HTTP-level tests: drive the router in-process, no sockets.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use review_service::seed::{seed_review, seed_reviews, SEED_REVIEW_ID};
use review_service::{
    router, AppState, DocumentStore, JsonlStore, MemoryStore, Review, StorageError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn memory_app() -> (Router, Arc<MemoryStore<Review>>) {
    let store = Arc::new(MemoryStore::<Review>::new());
    let app = router(AppState::new(store.clone()));
    (app, store)
}

/// A store whose collection lock is gone.
struct PoisonedStore;

impl DocumentStore<Review> for PoisonedStore {
    fn find_all(&self) -> Result<Vec<Review>, StorageError> {
        Err(StorageError::Poisoned("reviews"))
    }

    fn save(&self, _doc: Review) -> Result<Review, StorageError> {
        Err(StorageError::Poisoned("reviews"))
    }

    fn delete_by_id(&self, _id: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned("reviews"))
    }
}

/// A store that panics inside every call.
struct PanickingStore;

impl DocumentStore<Review> for PanickingStore {
    fn find_all(&self) -> Result<Vec<Review>, StorageError> {
        panic!("store crashed");
    }

    fn save(&self, _doc: Review) -> Result<Review, StorageError> {
        panic!("store crashed");
    }

    fn delete_by_id(&self, _id: &str) -> Result<(), StorageError> {
        panic!("store crashed");
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn list(app: &Router) -> Vec<Value> {
    let response = send(app, Method::GET, "/api/reviews", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    match body_json(response).await {
        Value::Array(items) => items,
        other => panic!("expected array, got {other}"),
    }
}

#[tokio::test]
async fn create_assigns_id_and_shows_up_in_list() {
    let (app, _) = memory_app();

    let response = send(
        &app,
        Method::POST,
        "/api/reviews",
        Some(json!({ "username": "A", "bookTitle": "B", "rating": 5, "comment": "Great" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    let id = created["id"].as_str().expect("generated id");
    assert!(!id.is_empty());
    assert_eq!(
        created,
        json!({ "id": id, "username": "A", "bookTitle": "B", "rating": 5, "comment": "Great" })
    );

    assert_eq!(list(&app).await, vec![created]);
}

#[tokio::test]
async fn create_with_empty_id_gets_generated_one() {
    let (app, _) = memory_app();

    let response = send(
        &app,
        Method::POST,
        "/api/reviews",
        Some(json!({ "id": "", "username": "A", "rating": 3 })),
    )
    .await;
    let created = body_json(response).await;
    assert_ne!(created["id"], json!(""));
}

#[tokio::test]
async fn update_on_unknown_id_creates_record() {
    let (app, store) = memory_app();

    let response = send(
        &app,
        Method::PUT,
        "/api/reviews/123",
        Some(json!({ "username": "X", "rating": 1 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let saved = body_json(response).await;
    assert_eq!(saved["id"], json!("123"));
    assert_eq!(saved["username"], json!("X"));
    assert_eq!(saved["bookTitle"], Value::Null);

    let stored = store.find_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.as_deref(), Some("123"));
}

#[tokio::test]
async fn update_uses_path_id_over_body_id() {
    let (app, store) = memory_app();
    store
        .save(Review {
            id: Some("keep".into()),
            username: Some("old".into()),
            rating: 2,
            ..Review::default()
        })
        .unwrap();

    let response = send(
        &app,
        Method::PUT,
        "/api/reviews/keep",
        Some(json!({ "id": "other", "username": "new", "rating": 4 })),
    )
    .await;
    assert_eq!(body_json(response).await["id"], json!("keep"));

    let stored = store.find_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.as_deref(), Some("keep"));
    assert_eq!(stored[0].username.as_deref(), Some("new"));
    assert_eq!(stored[0].rating, 4);
    // Full replacement: fields absent from the body are cleared.
    assert_eq!(stored[0].comment, None);
}

#[tokio::test]
async fn delete_removes_record() {
    let (app, _) = memory_app();

    let created = body_json(
        send(&app, Method::POST, "/api/reviews", Some(json!({ "username": "A", "rating": 1 }))).await,
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let response = send(&app, Method::DELETE, &format!("/api/reviews/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn delete_unknown_id_is_ok_and_changes_nothing() {
    let (app, store) = memory_app();
    seed_reviews(&*store).unwrap();

    let response = send(&app, Method::DELETE, "/api/reviews/doesnotexist", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    assert_eq!(store.find_all().unwrap(), vec![seed_review()]);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let (app, store) = memory_app();

    let response = send(
        &app,
        Method::POST,
        "/api/reviews",
        Some(json!({ "username": "A", "rating": "five" })),
    )
    .await;
    assert!(response.status().is_client_error());
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (app, _) = memory_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/reviews")
        .header(header::ORIGIN, "https://example.org")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn health_reports_review_count() {
    let (app, store) = memory_app();
    seed_reviews(&*store).unwrap();

    let health = body_json(send(&app, Method::GET, "/health", None).await).await;
    assert_eq!(health["status"], json!("healthy"));
    assert_eq!(health["total_reviews"], json!(1));
}

#[tokio::test]
async fn restart_keeps_single_seed_and_user_records() {
    let dir = TempDir::new().unwrap();

    let created_id = {
        let store = Arc::new(JsonlStore::<Review>::open(dir.path()).unwrap());
        seed_reviews(&*store).unwrap();
        let app = router(AppState::new(store));

        let created = body_json(
            send(&app, Method::POST, "/api/reviews", Some(json!({ "username": "A", "rating": 5 })))
                .await,
        )
        .await;
        created["id"].as_str().unwrap().to_string()
    };

    let store = Arc::new(JsonlStore::<Review>::open(dir.path()).unwrap());
    seed_reviews(&*store).unwrap();
    let app = router(AppState::new(store));

    let items = list(&app).await;
    let seeds = items.iter().filter(|r| r["id"] == json!(SEED_REVIEW_ID)).count();
    assert_eq!(seeds, 1);
    assert!(items.iter().any(|r| r["id"] == json!(created_id)));
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn null_rating_is_stored_as_zero() {
    let (app, store) = memory_app();

    let response = send(
        &app,
        Method::POST,
        "/api/reviews",
        Some(json!({ "username": "A", "rating": null })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rating"], json!(0));
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn numeric_string_and_float_ratings_are_coerced() {
    let (app, store) = memory_app();

    for (rating, expected) in [(json!("5"), 5), (json!(4.0), 4)] {
        let response = send(
            &app,
            Method::POST,
            "/api/reviews",
            Some(json!({ "username": "A", "rating": rating })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["rating"], json!(expected));
    }
    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test]
async fn get_by_id_returns_review() {
    let (app, store) = memory_app();
    seed_reviews(&*store).unwrap();

    let response = send(
        &app,
        Method::GET,
        &format!("/api/reviews/{}", SEED_REVIEW_ID.replace(' ', "%20")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let review: Review = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(review, seed_review());
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let (app, _) = memory_app();

    let response = send(&app, Method::GET, "/api/reviews/doesnotexist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = body_json(response).await;
    assert_eq!(error["error"], json!("404 Not Found"));
}

#[tokio::test]
async fn storage_failure_is_a_server_error() {
    let app = router(AppState::new(Arc::new(PoisonedStore)));

    let response = send(&app, Method::GET, "/api/reviews", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(&app, Method::DELETE, "/api/reviews/x", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_reports_degraded_store() {
    let app = router(AppState::new(Arc::new(PoisonedStore)));

    let response = send(&app, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["status"], json!("degraded"));
}

#[tokio::test]
async fn panicking_store_call_becomes_server_error() {
    let app = router(AppState::new(Arc::new(PanickingStore)));

    let response = send(
        &app,
        Method::PUT,
        "/api/reviews/1",
        Some(json!({ "username": "A", "rating": 1 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cors_preflight_allows_writes() {
    let (app, _) = memory_app();

    for method in ["PUT", "DELETE"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/reviews/123")
            .header(header::ORIGIN, "https://example.org")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "preflight for {method}");
        let headers = response.headers();
        for name in [
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::ACCESS_CONTROL_ALLOW_METHODS,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
        ] {
            assert_eq!(
                headers.get(&name).and_then(|v| v.to_str().ok()),
                Some("*"),
                "{name} for {method}"
            );
        }
    }
}
