//! Router-level tests for the HTTP surface, driven through tower's
//! `oneshot` without a listener.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use ai_completion_service::{AzureOpenAiService, CompletionConfig};
use api::{AppState, EnvReport, router};
use rag_search::DocumentRetriever;
use retry_policy::RetryPolicy;

/// State with neither dependency available.
fn unconfigured_state() -> Arc<AppState> {
    Arc::new(AppState {
        completion: None,
        completion_configured: false,
        completion_endpoint: None,
        retriever: DocumentRetriever::unconfigured(),
        search_configured: false,
        search_endpoint: None,
        env_report: EnvReport::capture(),
        init_warning: Some("completion configuration missing".to_string()),
        instance_id: "unknown".to_string(),
    })
}

/// State whose completion handle exists but points nowhere; good enough for
/// paths that reject before any completion call.
fn state_with_completion() -> Arc<AppState> {
    let cfg = CompletionConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        deployment: "gpt-4o".to_string(),
        api_version: "2023-12-01-preview".to_string(),
        timeout_secs: 5,
        retry: RetryPolicy::new(0, Duration::from_millis(1), Duration::from_millis(1)),
    };
    Arc::new(AppState {
        completion: Some(AzureOpenAiService::new(cfg).unwrap()),
        completion_configured: true,
        completion_endpoint: Some("http://127.0.0.1:9".to_string()),
        retriever: DocumentRetriever::unconfigured(),
        search_configured: false,
        search_endpoint: None,
        env_report: EnvReport::capture(),
        init_warning: None,
        instance_id: "unknown".to_string(),
    })
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn missing_query_field_returns_400() {
    let app = router(state_with_completion());
    let (status, body) = send(app, post_json("/api/career-plan", "{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn empty_query_string_returns_400() {
    let app = router(state_with_completion());
    let (status, body) = send(app, post_json("/api/career-plan", r#"{"query":"  "}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let app = router(state_with_completion());
    let (status, body) = send(app, post_json("/api/career-plan", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn unconfigured_completion_returns_503() {
    let app = router(unconfigured_state());
    let (status, body) = send(
        app,
        post_json("/api/career-plan", r#"{"query":"How do I grow?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("configuration"));
}

#[tokio::test]
async fn infra_probe_health_is_always_healthy() {
    let app = router(unconfigured_state());
    let req = Request::builder()
        .uri("/health")
        .header(header::USER_AGENT, "Edge/HealthCheck")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("components").is_none());
}

#[tokio::test]
async fn detailed_health_reports_degraded_components_with_200() {
    let app = router(unconfigured_state());
    let req = Request::builder()
        .uri("/health")
        .header(header::USER_AGENT, "Mozilla/5.0")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["webapp"], "healthy");
    assert_eq!(body["components"]["openai"]["status"], "degraded");
    assert_eq!(body["components"]["search"]["status"], "degraded");
    assert_eq!(body["warnings"], "completion configuration missing");
}

#[tokio::test]
async fn root_endpoint_excludes_credentials() {
    let app = router(unconfigured_state());
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    let env = body["environment_variables"].as_object().unwrap();
    assert!(env.keys().all(|k| !k.contains("KEY")));
    for value in env.values() {
        let v = value.as_str().unwrap();
        assert!(v == "SET" || v == "NOT SET");
    }
}
