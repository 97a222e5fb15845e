//! 注册与登录的 HTTP 处理器

use crate::{
    error::AppError,
    handlers::json_rejection,
    middleware::AppState,
    models::{auth::*, user::*},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(json_rejection)?;

    let user = state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

/// 用户登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload.map_err(json_rejection)?;

    let response = state.auth_service.login(req, Utc::now()).await?;

    Ok(Json(response))
}
