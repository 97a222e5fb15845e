//! 认证服务：用户注册与登录

use crate::{
    auth::{jwt::TokenIssuer, password::PasswordHasher, AuthError},
    error::{AppError, Identifier},
    models::{auth::*, user::*},
    repository::UserStore,
};
use chrono::{DateTime, Utc};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use uuid::Uuid;
use validator::Validate;

/// 登录失败时统一返回的消息（不区分用户不存在与密码错误）
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
    password_min_length: usize,
    /// 邮箱不存在时用于比对的哈希，参数与真实哈希一致
    dummy_hash: String,
    password_checks: AtomicU64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        issuer: Arc<TokenIssuer>,
        password_min_length: usize,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string())?;

        Ok(Self {
            users,
            hasher,
            issuer,
            password_min_length,
            dummy_hash,
            password_checks: AtomicU64::new(0),
        })
    }

    /// 已执行的密码校验次数
    pub fn password_checks(&self) -> u64 {
        self.password_checks.load(Ordering::Relaxed)
    }

    /// 注册新用户
    pub async fn register(&self, req: CreateUserRequest) -> Result<User, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, self.password_min_length)?;

        let email = req.email.trim().to_string();
        let username = req.username.trim().to_string();

        if self.users.email_exists(&email).await? {
            return Err(AppError::DuplicateIdentifier(Identifier::Email));
        }
        if self.users.username_exists(&username).await? {
            return Err(AppError::DuplicateIdentifier(Identifier::Username));
        }

        let password_hash = self.hash_password(req.password).await?;

        // 并发注册由存储层的唯一约束兜底
        let user = self
            .users
            .insert(NewUser {
                name: req.name,
                username,
                email,
                password_hash,
                access: req.access,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        metrics::counter!("users_created_total").increment(1);

        Ok(user)
    }

    /// 用户登录，成功时签发令牌
    pub async fn login(
        &self,
        req: LoginRequest,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, AppError> {
        req.validate()?;

        let email = req.email.trim();

        let Some(user) = self.users.find_by_email(email).await? else {
            // 未知邮箱同样执行一次 Argon2 校验
            self.verify_password(req.password, self.dummy_hash.clone()).await?;
            tracing::info!(reason = "unknown_email", "Login failed");
            metrics::counter!("auth_login_failed_total").increment(1);
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if !self.verify_password(req.password, user.password_hash.clone()).await? {
            tracing::info!(user_id = %user.id, reason = "wrong_password", "Login failed");
            metrics::counter!("auth_login_failed_total").increment(1);
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        let token = self.issuer.issue(&user.email, now)?;

        tracing::info!(user_id = %user.id, "Login successful");
        metrics::counter!("auth_login_success_total").increment(1);

        Ok(LoginResponse {
            token,
            message: "Login successful".to_string(),
            expires_in: self.issuer.ttl_secs(),
        })
    }

    /// Argon2 计算量大，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal_error(&format!("Hashing task failed: {}", e)))??;

        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        self.password_checks.fetch_add(1, Ordering::Relaxed);

        let hasher = self.hasher.clone();
        let result = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::internal_error(&format!("Verification task failed: {}", e)))?;

        match result {
            Ok(matched) => Ok(matched),
            // 存储的哈希无法解析时按凭证错误处理
            Err(AuthError::Verification(reason)) => {
                tracing::warn!("Stored password hash rejected: {}", reason);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
