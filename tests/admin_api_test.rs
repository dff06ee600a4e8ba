//! Admin API integration tests.
//!
//! Exercises the dashboard, settings updates, metric and error clearing, and
//! the catalog test endpoint through the router.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{mount_iron_claw, TestHarness};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN: &str = "/api/admin/mediabot";

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(harness: &TestHarness, req: Request<Body>) -> (StatusCode, Value) {
    let response = harness.router().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

#[tokio::test]
async fn health_is_always_available() {
    let harness = TestHarness::with_config(|c| c.server.admin_api_key = Some("k".into())).await;
    let (status, _) = send(&harness, request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_lists_settings_metrics_and_errors() {
    let harness = TestHarness::new().await;
    let (status, body) = send(&harness, request(Method::GET, ADMIN, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["bot"]["enabled"], true);
    assert_eq!(body["settings"]["bot"]["enabled_tags"], json!(["movie", "tv"]));
    assert_eq!(body["settings"]["display"]["max_cast"], 3);
    for service in ["tmdb", "tvdb"] {
        for metric in [
            "api_response_time",
            "cache_hits",
            "cache_misses",
            "error_count",
            "request_count",
        ] {
            assert!(
                body["metrics"][service][metric].is_object(),
                "missing {service}.{metric}"
            );
        }
    }
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["available_services"], json!(["tmdb", "tvdb"]));
}

#[tokio::test]
async fn admin_routes_require_bearer_key_when_configured() {
    let harness =
        TestHarness::with_config(|c| c.server.admin_api_key = Some("admin-secret".into())).await;

    let (status, _) = send(&harness, request(Method::GET, ADMIN, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri(ADMIN)
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&harness, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let right = Request::builder()
        .uri(ADMIN)
        .header(header::AUTHORIZATION, "Bearer admin-secret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&harness, right).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn settings_update_is_partial() {
    let harness = TestHarness::new().await;
    let (status, body) = send(
        &harness,
        request(
            Method::PUT,
            &format!("{ADMIN}/settings"),
            Some(json!({
                "bot": {"enabled_tags": "film, series", "enabled_categories": "4,9"},
                "display": {"poster": false}
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["settings"]["bot"]["enabled_tags"], json!(["film", "series"]));

    let settings = harness.ctx.settings.read().clone();
    assert_eq!(settings.bot.enabled_categories.len(), 2);
    assert!(settings.bot.enabled);
    assert!(!settings.display.poster);
    assert!(settings.display.cast);
}

#[tokio::test]
async fn settings_update_rejects_unknown_keys() {
    let harness = TestHarness::new().await;
    let (status, body) = send(
        &harness,
        request(
            Method::PUT,
            &format!("{ADMIN}/settings"),
            Some(json!({"bot": {"enabled": false, "shout": true}})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "validation");
    assert!(harness.ctx.settings.read().bot.enabled);
}

#[tokio::test]
async fn settings_update_is_written_to_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "# MediaBot\n[server]\nport = 9000\n\n[bot]\nenabled = true\n",
    )
    .unwrap();

    let harness = TestHarness::with_options(|_| {}, Some(path.clone())).await;
    let (status, _) = send(
        &harness,
        request(
            Method::PUT,
            &format!("{ADMIN}/settings"),
            Some(json!({"bot": {"enabled": false}, "display": {"runtime": false}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let reloaded = mediabot::config::load_config(&path).unwrap();
    assert!(!reloaded.bot.enabled);
    assert!(!reloaded.display.runtime);
    assert_eq!(reloaded.server.port, 9000);
    assert!(std::fs::read_to_string(&path).unwrap().starts_with("# MediaBot"));
}

#[tokio::test]
async fn test_api_returns_record() {
    let harness = TestHarness::new().await;
    mount_iron_claw(&harness.catalog, 1).await;

    let (status, body) = send(
        &harness,
        request(
            Method::POST,
            &format!("{ADMIN}/test_api"),
            Some(json!({"service": "tmdb", "title": "The Iron Claw"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["kind"], "movie");
    assert_eq!(body["data"]["title"], "The Iron Claw");

    let (_, dashboard) = send(&harness, request(Method::GET, ADMIN, None)).await;
    let requests: f64 = dashboard["metrics"]["tmdb"]["request_count"]
        .as_object()
        .unwrap()
        .values()
        .filter_map(Value::as_f64)
        .sum();
    assert_eq!(requests, 1.0);

    let (status, _) = send(&harness, request(Method::POST, &format!("{ADMIN}/clear_metrics"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, dashboard) = send(&harness, request(Method::GET, ADMIN, None)).await;
    assert_eq!(dashboard["metrics"]["tmdb"]["request_count"], json!({}));
}

#[tokio::test]
async fn test_api_validation_failures_are_recorded() {
    let harness = TestHarness::new().await;

    let (status, body) = send(
        &harness,
        request(
            Method::POST,
            &format!("{ADMIN}/test_api"),
            Some(json!({"service": "imdb", "title": "Heat"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request:"));

    let (status, _) = send(
        &harness,
        request(
            Method::POST,
            &format!("{ADMIN}/test_api"),
            Some(json!({"service": "tvdb", "title": "  "})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, dashboard) = send(&harness, request(Method::GET, ADMIN, None)).await;
    let errors = dashboard["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["kind"], "validation");
    assert_eq!(errors[0]["context"]["service"], "tvdb");

    let (_, cleared) = send(&harness, request(Method::POST, &format!("{ADMIN}/clear_errors"), None)).await;
    assert_eq!(cleared["cleared"], 2);
    assert!(harness.ctx.errors.recent(50).is_empty());
}
