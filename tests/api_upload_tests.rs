//! 上传 API 集成测试

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};

mod common;
use common::{body_json, multipart_body, upload_request, TestApp, TEST_PASSWORD};

async fn logged_in(app: &TestApp) -> String {
    app.create_user("Alice", "alice", "alice@example.com").await;
    app.login_token("alice@example.com", TEST_PASSWORD).await
}

#[tokio::test]
async fn test_upload_without_token() {
    let app = TestApp::new();
    let body = multipart_body(&[("file", Some("hello.txt"), b"hello")]);

    let response = app.send(upload_request(None, body)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_upload_with_malformed_header() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let body = multipart_body(&[("file", Some("hello.txt"), b"hello")]);

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", common::MULTIPART_BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Token {}", token))
        .body(Body::from(body))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_upload_with_garbage_token() {
    let app = TestApp::new();
    let body = multipart_body(&[("file", Some("hello.txt"), b"hello")]);

    let response = app.send(upload_request(Some("not.a.token"), body)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 401);
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_upload_with_expired_token() {
    let app = TestApp::new();
    let issued_at = Utc::now() - Duration::hours(25);
    let token = app.issuer().issue("alice@example.com", issued_at).unwrap();
    let body = multipart_body(&[("file", Some("hello.txt"), b"hello")]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_upload_success() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let body = multipart_body(&[("file", Some("hello.txt"), b"hello world")]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "File uploaded successfully");

    let keys = app.objects.keys();
    assert_eq!(keys.len(), 1);

    // 键格式 "{unix_nanos}_{文件名}"
    let key = &keys[0];
    let (nanos, name) = key.split_once('_').unwrap();
    assert!(nanos.parse::<i64>().is_ok());
    assert_eq!(name, "hello.txt");
    assert_eq!(json["url"], format!("memory://{}", key));

    let object = app.objects.get(key).unwrap();
    assert_eq!(&object.data[..], b"hello world");
    assert_eq!(object.content_type, "text/plain");
}

#[tokio::test]
async fn test_upload_strips_directory_from_filename() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let body = multipart_body(&[("file", Some("../../etc/passwd"), b"x")]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let keys = app.objects.keys();
    assert!(keys[0].ends_with("_passwd"));
    assert!(!keys[0].contains('/'));
}

#[tokio::test]
async fn test_upload_ignores_other_fields() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let body = multipart_body(&[
        ("description", None, b"a note"),
        ("file", Some("data.csv"), b"a,b\n1,2\n"),
    ]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.objects.len(), 1);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let body = multipart_body(&[("description", None, b"no file here")]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "No file uploaded");
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_upload_file_field_without_filename() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let body = multipart_body(&[("file", None, b"plain form value")]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "No file uploaded");
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let app = TestApp::new();
    let token = logged_in(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{}"))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Failed to parse form data");
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = TestApp::new();
    let token = logged_in(&app).await;
    let limit = app.state.config.storage.max_upload_bytes;
    let content = vec![b'a'; limit + 1];
    let body = multipart_body(&[("file", Some("big.bin"), &content)]);

    let response = app.send(upload_request(Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.objects.is_empty());
}
