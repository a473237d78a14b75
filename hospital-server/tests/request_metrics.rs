//! Request metrics through the global recorder
//!
//! Kept in its own test binary: the recorder can be installed once per
//! process.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hospital_server::cache::ReadThroughCache;
use hospital_server::db::create_pool_with_options;
use hospital_server::http::metrics::{install_recorder, HTTP_REQUESTS_TOTAL};
use hospital_server::{build_router, AppState, Database};
use sqlx::postgres::PgConnectOptions;
use tower::ServiceExt;

fn counter_line<'a>(rendered: &'a str, labels: &[&str]) -> Option<&'a str> {
    rendered
        .lines()
        .filter(|line| line.starts_with(HTTP_REQUESTS_TOTAL))
        .find(|line| labels.iter().all(|label| line.contains(label)))
}

#[tokio::test]
async fn requests_are_labelled_by_route_template() {
    let handle = install_recorder().unwrap();
    let options = PgConnectOptions::new().host("127.0.0.1").port(1);
    let db = Database::new(create_pool_with_options(options, 1, Duration::from_millis(200)));
    let state = AppState::new(db, ReadThroughCache::disabled(), handle.clone());
    let app = build_router(state, &PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"));

    for (uri, expected) in [
        ("/room/abc", StatusCode::BAD_REQUEST),
        ("/no/such/route", StatusCode::NOT_FOUND),
    ] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "{}", uri);
    }

    let rendered = handle.render();
    assert!(
        counter_line(
            &rendered,
            &[r#"method="GET""#, r#"endpoint="/room/{room_no}""#, r#"status="400""#]
        )
        .is_some(),
        "{}",
        rendered
    );
    assert!(
        counter_line(&rendered, &[r#"endpoint="unmatched""#, r#"status="404""#]).is_some(),
        "{}",
        rendered
    );
    // Concrete paths never become label values
    assert!(!rendered.contains("/room/abc"));
    assert!(!rendered.contains("/no/such/route"));
}
