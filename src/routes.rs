//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

use crate::{handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.storage.max_upload_bytes;

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 注册与登录（无需认证）
    let auth_routes = Router::new()
        .route("/api/create-user", post(handlers::auth::create_user))
        .route("/api/login", post(handlers::auth::login));

    // 上传（需要认证）；会话中间件在最外层，未认证请求不会读取请求体
    let upload_routes = Router::new()
        .route("/api/upload", post(handlers::upload::upload_file))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(axum::middleware::from_fn_with_state(
            state.token_verifier.clone(),
            crate::auth::session_middleware,
        ));

    let mut router = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(upload_routes);

    // 本地存储直接由本服务提供静态访问
    let storage = &state.config.storage;
    if storage.backend.eq_ignore_ascii_case("local") && storage.local.base_url.starts_with('/') {
        let mount = storage.local.base_url.trim_end_matches('/');
        if !mount.is_empty() {
            router = router.nest_service(mount, ServeDir::new(&storage.local.base_path));
        }
    }

    router
        .layer(crate::middleware::cors_layer(&state.config.cors))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
