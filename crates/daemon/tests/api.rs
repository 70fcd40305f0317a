//! Drives the full router against an in-memory local store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;

use common::gate::TokenGate;
use common::relay::MAX_FILE_SIZE;
use common::sync::FALLBACK_QUOTE;
use ideal_daemon::backend::LocalStore;
use ideal_daemon::http_server::{router, MAX_REQUEST_BODY_BYTES};
use ideal_daemon::ServiceState;

const TOKEN: &str = "s3cret";

async fn app() -> Router {
    let base = Url::parse("http://localhost:3000/").unwrap();
    let store = LocalStore::ephemeral(base).await.unwrap();
    let state = ServiceState::new(Arc::new(store), TokenGate::new(Some(TOKEN.to_string())));
    router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("adminToken", TOKEN)
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn quiz(title: &str, board: &str, class: &str) -> Value {
    json!({
        "type": "quiz",
        "title": title,
        "link": "https://forms.example/quiz",
        "board": board,
        "class": class,
        "time": "30",
        "marks": "20"
    })
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "Server is running");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_writes_require_token() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/content")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(quiz("Algebra", "CBSE", "Class 10").to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/content/1")
        .header("admintoken", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, get("/api/content")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_list_scope_delete() {
    let app = app().await;

    let (status, body) = send(
        &app,
        admin(Method::POST, "/api/content", Some(quiz("Algebra", "CBSE", "Class 10"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Content created successfully");
    assert_eq!(body["data"]["marks"], "20");
    let first_id = body["data"]["id"].as_str().unwrap().to_string();

    let mut note = quiz("Geometry notes", "CBSE", "Class 10");
    note["type"] = json!("note");
    let (status, body) = send(&app, admin(Method::POST, "/api/content", Some(note))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("marks").map_or(true, Value::is_null));

    send(
        &app,
        admin(Method::POST, "/api/content", Some(quiz("Physics", "ICSE", "Class 9"))),
    )
    .await;

    let (_, body) = send(&app, get("/api/content")).await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Physics", "Geometry notes", "Algebra"]);

    let (_, body) = send(&app, get("/api/content/CBSE/Class%2010")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/api/content/CBSE/Class%2010?type=quiz")).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Algebra");

    let (status, body) = send(
        &app,
        admin(Method::DELETE, &format!("/api/content/{}", first_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Content deleted successfully");

    let (_, body) = send(&app, get("/api/content/CBSE/Class%2010?type=quiz")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_validation() {
    let app = app().await;

    let mut untitled = quiz("  ", "CBSE", "Class 10");
    let request = admin(Method::POST, "/api/content", Some(untitled.clone()));
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    untitled["title"] = json!("No link");
    untitled["link"] = json!("");
    let (status, _) = send(&app, admin(Method::POST, "/api/content", Some(untitled))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/api/content")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_with_file_then_fetch_and_delete() {
    let app = app().await;
    let pdf = b"%PDF-1.4 chapter one";

    let mut note = quiz("Chapter 1", "CBSE", "Class 10");
    note["type"] = json!("note");
    note["link"] = json!("");
    note["file"] = json!({
        "fileName": "chapter1.pdf",
        "fileContent": base64_encode(pdf),
    });

    let (status, body) = send(&app, admin(Method::POST, "/api/content", Some(note))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let record = &body["data"];
    assert_eq!(record["isStorageFile"], true);
    assert_eq!(record["fileName"], "chapter1.pdf");
    let storage_path = record["storagePath"].as_str().unwrap().to_string();
    assert!(storage_path.ends_with("-chapter1.pdf"));
    let link = record["link"].as_str().unwrap().to_string();
    assert_eq!(
        link,
        format!("http://localhost:3000/files/content-files/{}", storage_path)
    );
    let id = record["id"].as_str().unwrap().to_string();

    let file_uri = format!("/files/content-files/{}", storage_path);
    let response = app.clone().oneshot(get(&file_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], pdf);

    let uri = format!("/api/content/{}", id);
    let (status, _) = send(&app, admin(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&file_uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn test_upload() {
    let app = app().await;

    let (status, body) = send(
        &app,
        admin(
            Method::POST,
            "/api/upload",
            Some(json!({ "fileName": "notes.txt", "fileContent": base64_encode(b"hello") })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileName"], "notes.txt");
    let public_url = body["publicUrl"].as_str().unwrap();
    let path = Url::parse(public_url).unwrap().path().to_string();

    let response = app.clone().oneshot(get(&path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(
        &app,
        admin(Method::POST, "/api/upload", Some(json!({ "fileName": "notes.txt" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fileName or fileContent");
}

#[tokio::test]
async fn test_quote_fallback_and_pick() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/quotes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quote"], FALLBACK_QUOTE);

    let mut quote = quiz("Practice makes perfect", "", "");
    quote["type"] = json!("quote");
    send(&app, admin(Method::POST, "/api/content", Some(quote))).await;

    let (_, body) = send(&app, get("/api/quotes")).await;
    assert_eq!(body["quote"], "Practice makes perfect");
}

#[tokio::test]
async fn test_delete_unknown_id() {
    let app = app().await;
    let (status, body) = send(&app, admin(Method::DELETE, "/api/content/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Route not found" }));
}

#[tokio::test]
async fn test_wrong_method_is_unknown_route() {
    let app = app().await;
    let not_found = json!({ "success": false, "error": "Route not found" });

    let (status, body) = send(&app, get("/api/content/123")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found);

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/content")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found);
}

#[tokio::test]
async fn test_oversize_files_rejected() {
    let app = app().await;
    let oversize = base64_encode(&vec![7u8; MAX_FILE_SIZE + 1]);

    let (status, body) = send(
        &app,
        admin(
            Method::POST,
            "/api/upload",
            Some(json!({ "fileName": "big.pdf", "fileContent": oversize })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("too large"));

    let mut note = quiz("Huge notes", "CBSE", "Class 10");
    note["type"] = json!("note");
    note["link"] = json!("");
    note["file"] = json!({ "fileName": "big.pdf", "fileContent": oversize });
    let (status, body) = send(&app, admin(Method::POST, "/api/content", Some(note))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);

    let (_, body) = send(&app, get("/api/content")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_file_at_size_limit_accepted() {
    let app = app().await;
    let payload = json!({
        "fileName": "exact.pdf",
        "fileContent": base64_encode(&vec![7u8; MAX_FILE_SIZE]),
    });
    assert!(payload.to_string().len() <= MAX_REQUEST_BODY_BYTES);

    let (status, body) = send(&app, admin(Method::POST, "/api/upload", Some(payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileName"], "exact.pdf");
}

#[tokio::test]
async fn test_readiness() {
    let app = app().await;
    let response = app.clone().oneshot(get("/_status/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn base64_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}
