//! 健康检查 API 集成测试

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

mod common;
use common::{body_json, TestApp};

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let response = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = TestApp::new();

    let response = app
        .send(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ready"], true);

    let checks = json["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 2);
    assert!(checks.iter().all(|c| c["healthy"] == true));
    assert!(checks.iter().all(|c| c["backend"] == "memory"));
}

#[tokio::test]
async fn test_trace_id_propagated() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers()["x-trace-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/upload")
                .header(header::ORIGIN, "http://127.0.0.1:5500")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://127.0.0.1:5500"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();

    let response = app
        .send(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
