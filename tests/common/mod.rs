//! 测试公共模块
//! 提供测试配置、应用状态构建和请求辅助函数

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::sync::Arc;
use tower::ServiceExt;
use upload_service::{
    app,
    auth::{SigningSecret, TokenIssuer},
    config::{
        AppConfig, CorsConfig, DatabaseConfig, LocalStorageConfig, LoggingConfig,
        S3StorageConfig, SecurityConfig, ServerConfig, StorageConfig,
    },
    middleware::AppState,
    repository::MemoryUserStore,
    routes,
    services::MemoryObjectStore,
};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";
pub const TEST_PASSWORD: &str = "TestPass123";
pub const MULTIPART_BOUNDARY: &str = "X-UPLOAD-TEST-BOUNDARY";

/// 创建测试配置（内存后端，低成本哈希参数）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            backend: "memory".to_string(),
            url: Secret::new(String::new()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret_file: None,
            jwt_secret: Some(Secret::new(TEST_SECRET.to_string())),
            token_ttl_secs: 86400,
            password_min_length: 8,
            password_hash_memory_kib: 1024,
            password_hash_iterations: 1,
            password_hash_parallelism: 1,
        },
        storage: StorageConfig {
            backend: "memory".to_string(),
            max_upload_bytes: 64 * 1024,
            local: LocalStorageConfig {
                base_path: "./uploads".to_string(),
                base_url: "/files".to_string(),
            },
            s3: S3StorageConfig {
                bucket: String::new(),
                region: "us-east-1".to_string(),
                endpoint: None,
                access_key: None,
                secret_key: None,
                public_base_url: None,
            },
        },
        cors: CorsConfig {
            allowed_origins: "http://127.0.0.1:5500".to_string(),
            allow_credentials: true,
        },
    }
}

/// 测试应用：路由加上可直接检查的内存后端
pub struct TestApp {
    pub state: Arc<AppState>,
    pub users: Arc<MemoryUserStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(create_test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let objects = Arc::new(MemoryObjectStore::new());
        let state = app::build_state(config, users.clone(), objects.clone())
            .expect("Failed to build test state");

        Self {
            state,
            users,
            objects,
        }
    }

    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// 使用与服务相同的密钥签发令牌
    pub fn issuer(&self) -> TokenIssuer {
        let secret = SigningSecret::from_bytes(TEST_SECRET.as_bytes().to_vec())
            .expect("Failed to load test secret");
        TokenIssuer::new(&secret, self.state.config.security.token_ttl_secs)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router()
            .oneshot(request)
            .await
            .expect("Router returned an error")
    }

    /// 注册一个用户，返回响应
    pub async fn create_user(&self, name: &str, username: &str, email: &str) -> Response<Body> {
        let body = serde_json::json!({
            "name": name,
            "username": username,
            "email": email,
            "password": TEST_PASSWORD,
        });
        self.send(json_request("/api/create-user", &body)).await
    }

    /// 登录并返回令牌
    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.send(json_request("/api/login", &body)).await;
        let json = body_json(response).await;
        json["token"]
            .as_str()
            .expect("Login response missing token")
            .to_string()
    }
}

/// 构造 JSON POST 请求
pub fn json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// 构造 multipart 请求体，parts 为 (字段名, 文件名, 内容)
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: text/plain\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// 构造上传请求
pub fn upload_request(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        );

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body)).unwrap()
}

/// 读取响应体为 JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
