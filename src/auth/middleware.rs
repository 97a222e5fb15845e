//! 会话认证中间件

use crate::{auth::jwt::TokenVerifier, error::AppError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

/// 已认证身份（附加到请求扩展，仅在当前请求内可见）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// 令牌主体（用户邮箱）
    pub subject: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 Identity
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取 Bearer 令牌
///
/// 头缺失、格式不是 "Bearer <token>" 或令牌为空时返回 None
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split(' ');
    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => return None,
    };

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

/// 会话中间件 - 必须认证
pub async fn session_middleware(
    State(verifier): State<Arc<TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(req.headers()) else {
        tracing::debug!(reason = "missing", "Session rejected");
        metrics::counter!("auth_session_rejected_total", "reason" => "missing").increment(1);
        return Err(AppError::Unauthorized);
    };

    let claims = verifier.verify(token, Utc::now()).map_err(|e| {
        // 只记录失败类别，不记录令牌
        tracing::debug!(reason = e.kind(), "Session rejected");
        metrics::counter!("auth_session_rejected_total", "reason" => e.kind()).increment(1);
        AppError::from(e)
    })?;

    tracing::debug!(subject = %claims.sub, "Session accepted");

    req.extensions_mut().insert(Identity {
        subject: claims.sub,
    });

    Ok(next.run(req).await)
}
