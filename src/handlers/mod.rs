//! HTTP 处理器模块

pub mod auth;
pub mod health;
pub mod upload;

use crate::error::AppError;
use axum::extract::rejection::JsonRejection;

/// JSON 解析失败统一映射为 400
pub(crate) fn json_rejection(rejection: JsonRejection) -> AppError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    AppError::BadRequest("Invalid request body".to_string())
}
