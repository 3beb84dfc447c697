//! Router tests driven through `tower::ServiceExt::oneshot`.

use super::{AppState, router};
use crate::plugin::{
    adapters::{InMemoryPlugin, ProvisionBehaviour},
    domain::PluginName,
    services::PluginRegistry,
};
use crate::project::{adapters::memory::InMemoryProjectRepository, services::ProjectService};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    plugin: InMemoryPlugin,
}

#[fixture]
fn app() -> TestApp {
    let plugin = InMemoryPlugin::new(PluginName::new("proxmox").expect("valid plugin name"));
    let registry = PluginRegistry::new();
    registry
        .register(Arc::new(plugin.clone()))
        .expect("registration succeeds");
    let service = ProjectService::new(
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(registry),
        Arc::new(DefaultClock),
    );
    TestApp {
        router: router(AppState::new(Arc::new(service))),
        plugin,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let parsed = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, parsed)
}

async fn create_alpha(app: &TestApp) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/projects",
        Some(json!({ "name": "Alpha", "slug": "alpha" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn error_code(body: &Value) -> Option<&str> {
    body.pointer("/error/code").and_then(Value::as_str)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_returns_created_project(app: TestApp) {
    let body = create_alpha(&app).await;

    assert_eq!(body.get("slug"), Some(&json!("alpha")));
    assert_eq!(body.get("active"), Some(&json!(true)));
    assert!(body.get("id").and_then(Value::as_str).is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_accepts_unix_name_alias(app: TestApp) {
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/projects",
        Some(json!({ "name": "Legacy", "unix_name": "legacy-client" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("slug"), Some(&json!("legacy-client")));
}

#[rstest]
#[case(json!({ "name": "Bad", "slug": "Bad_Name" }), "INVALID_SLUG")]
#[case(json!({ "name": "ab", "slug": "valid-slug" }), "VALIDATION_FAILED")]
#[case(json!({ "name": "Missing slug" }), "INVALID_REQUEST")]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_create_requests_are_bad_requests(
    app: TestApp,
    #[case] payload: Value,
    #[case] code: &str,
) {
    let (status, body) = send(&app, Method::POST, "/api/v1/projects", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some(code));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_slug_is_a_conflict(app: TestApp) {
    create_alpha(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/projects",
        Some(json!({ "name": "Alpha", "slug": "alpha" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), Some("PROJECT_EXISTS"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provisioning_failure_still_creates(app: TestApp) {
    app.plugin
        .set_behaviour(ProvisionBehaviour::Fail("cli exploded".to_owned()));

    create_alpha(&app).await;
}

#[rstest]
#[case("/api/v1/projects/not-a-uuid", StatusCode::BAD_REQUEST, "INVALID_PROJECT_ID")]
#[case(
    "/api/v1/projects/6a1e4c7e-8d0b-4f57-9b0e-1f1f5d7c2a10",
    StatusCode::NOT_FOUND,
    "PROJECT_NOT_FOUND"
)]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_errors_map_to_distinct_statuses(
    app: TestApp,
    #[case] uri: &str,
    #[case] expected: StatusCode,
    #[case] code: &str,
) {
    let (status, body) = send(&app, Method::GET, uri, None).await;

    assert_eq!(status, expected);
    assert_eq!(error_code(&body), Some(code));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_then_delete_round_trip(app: TestApp) {
    let created = create_alpha(&app).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("id is present");
    let uri = format!("/api/v1/projects/{id}");

    let (update_status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "name": "Alpha Prime", "active": false })),
    )
    .await;
    let (delete_status, _) = send(&app, Method::DELETE, &uri, None).await;
    let (get_status, _) = send(&app, Method::GET, &uri, None).await;

    assert_eq!(update_status, StatusCode::OK);
    assert_eq!(updated.get("name"), Some(&json!("Alpha Prime")));
    assert_eq!(updated.get("active"), Some(&json!(false)));
    assert_eq!(delete_status, StatusCode::NO_CONTENT);
    assert_eq!(get_status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_honours_limit(app: TestApp) {
    for slug in ["alpha", "bravo", "charlie"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/projects",
            Some(json!({ "name": slug, "slug": slug })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/v1/projects?limit=2", None).await;
    let (_, everything) = send(&app, Method::GET, "/api/v1/projects?limit=0", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(everything.as_array().map(Vec::len), Some(3));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_plugin_state(app: TestApp) {
    let (healthy_status, healthy) = send(&app, Method::GET, "/api/v1/health", None).await;
    app.plugin.set_healthy(false);
    let (degraded_status, degraded) = send(&app, Method::GET, "/api/v1/health", None).await;

    assert_eq!(healthy_status, StatusCode::OK);
    assert_eq!(healthy.get("status"), Some(&json!("ok")));
    assert_eq!(degraded_status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(degraded.get("status"), Some(&json!("degraded")));
    assert_eq!(
        degraded.pointer("/plugins/0/plugin"),
        Some(&json!("proxmox"))
    );
}
