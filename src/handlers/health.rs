//! 健康检查处理器
//! 提供 /health（存活）与 /ready（就绪）端点

use crate::middleware::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// 记录进程启动时间（main 中尽早调用）
pub fn mark_started() {
    START_TIME.get_or_init(Instant::now);
}

/// 进程运行时长（秒）
pub fn get_uptime() -> u64 {
    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<ComponentCheck>,
}

#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub name: &'static str,
    pub backend: &'static str,
    pub healthy: bool,
}

/// 存活探针
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针：检查用户存储与对象存储
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let users_healthy = match state.users.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("User store not ready: {}", e);
            false
        }
    };
    let storage_healthy = state.object_store.health_check().await;

    let checks = vec![
        ComponentCheck {
            name: "user_store",
            backend: state.users.backend_name(),
            healthy: users_healthy,
        },
        ComponentCheck {
            name: "object_store",
            backend: state.object_store.backend_name(),
            healthy: storage_healthy,
        },
    ];

    let ready = checks.iter().all(|c| c.healthy);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
