//! Router tests against an unreachable database
//!
//! The pool is lazy, so every route that touches the database fails on its
//! own while the rest of the API keeps answering.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use hospital_server::cache::ReadThroughCache;
use hospital_server::db::create_pool_with_options;
use hospital_server::http::metrics::detached_handle;
use hospital_server::{build_router, AppState, Database};
use serde_json::Value;
use sqlx::postgres::PgConnectOptions;
use tower::ServiceExt;

fn app() -> Router {
    let options = PgConnectOptions::new().host("127.0.0.1").port(1);
    let db = Database::new(create_pool_with_options(options, 1, Duration::from_millis(200)));
    let state = AppState::new(db, ReadThroughCache::disabled(), detached_handle().unwrap());
    let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
    build_router(state, &static_dir)
}

async fn send(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_owned())
        }
        None => Body::empty(),
    };
    let response = app().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let (status, bytes) = send(method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_ok_when_dependencies_are_down() {
    let (status, body) = send_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Hospital Management System API");
    assert_eq!(body["database"], "disconnected");
    assert!(body["database_error"].is_string());
    assert_eq!(body["cache"], "disabled");
    assert!(body.get("cache_error").is_none());
    assert_eq!(body["metrics"]["prometheus_endpoint"], "/metrics");
}

#[tokio::test]
async fn api_test_route() {
    let (status, body) = send_json(Method::GET, "/api/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API is working");
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn reads_report_database_unavailable() {
    for uri in ["/patient", "/room/101", "/undergoes", "/common"] {
        let (status, body) = send_json(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        assert_eq!(body["error"], "database_unavailable", "{}", uri);
    }
}

#[tokio::test]
async fn writes_report_database_unavailable() {
    let (status, _) = send_json(
        Method::POST,
        "/room",
        Some(r#"{"room_no":101,"room_type":"ICU","available":1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send_json(Method::DELETE, "/room/101", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn bad_path_key_is_400() {
    for (method, uri) in [
        (Method::GET, "/patient/abc"),
        (Method::DELETE, "/doctor/1x"),
        (Method::GET, "/medication/ten"),
    ] {
        let (status, body) = send_json(method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (status, body) = send_json(Method::POST, "/patient", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send_json(Method::POST, "/patient", Some("[1, 2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn type_mismatch_is_rejected_before_the_database() {
    let (status, body) =
        send_json(Method::PUT, "/room/101", Some(r#"{"available":"plenty"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("available"));
}

#[tokio::test]
async fn update_without_mutable_fields_is_400() {
    // Key and unknown fields are not updatable
    let (status, body) =
        send_json(Method::PUT, "/room/101", Some(r#"{"room_no":5,"colour":"blue"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn associations_have_no_item_routes() {
    let (status, _) = send(Method::GET, "/undergoes/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(Method::DELETE, "/prescribes/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_endpoint_serves_text() {
    let response = app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4"
    );
}

#[tokio::test]
async fn landing_page_and_favicon() {
    let (status, bytes) = send(Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&bytes).contains("Hospital Management System API"));

    let (status, bytes) = send(Method::GET, "/favicon.ico", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!bytes.is_empty());
}
