//! 应用装配
//! 根据配置创建存储后端、服务与共享状态

use crate::{
    auth::{PasswordHasher, SigningSecret, TokenIssuer, TokenVerifier},
    config::{AppConfig, DatabaseConfig},
    db,
    error::AppError,
    middleware::AppState,
    repository::{MemoryUserStore, PgUserRepository, UserStore},
    services::{storage_service, AuthService, ObjectStore, UploadService},
};
use std::sync::Arc;

/// 根据配置创建用户存储（Postgres 会先执行迁移）
pub async fn build_user_store(config: &DatabaseConfig) -> Result<Arc<dyn UserStore>, AppError> {
    let store: Arc<dyn UserStore> = match config.backend.to_lowercase().as_str() {
        "postgres" => {
            let pool = db::connect(config).await?;
            Arc::new(PgUserRepository::new(pool))
        }
        "memory" => {
            tracing::warn!("Using in-memory user store, accounts are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
        other => {
            return Err(AppError::Config(format!("Unknown database backend: {}", other)));
        }
    };

    tracing::info!(backend = store.backend_name(), "User store initialized");
    Ok(store)
}

/// 组装应用状态
///
/// 签名密钥在这里加载，失败即启动失败
pub fn build_state(
    config: AppConfig,
    users: Arc<dyn UserStore>,
    object_store: Arc<dyn ObjectStore>,
) -> Result<Arc<AppState>, AppError> {
    let secret = SigningSecret::from_config(&config.security)?;
    let hasher = PasswordHasher::from_config(&config.security)?;

    let issuer = Arc::new(TokenIssuer::new(&secret, config.security.token_ttl_secs));
    let token_verifier = Arc::new(TokenVerifier::new(&secret));

    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        hasher,
        issuer,
        config.security.password_min_length,
    )?);
    let upload_service = Arc::new(UploadService::new(object_store.clone()));

    Ok(Arc::new(AppState {
        config,
        users,
        object_store,
        auth_service,
        upload_service,
        token_verifier,
    }))
}

/// 按配置创建全部后端并组装状态
pub async fn build_from_config(config: AppConfig) -> Result<Arc<AppState>, AppError> {
    // 先加载密钥，避免在密钥缺失时还去连接数据库
    SigningSecret::from_config(&config.security)?;

    let object_store = storage_service::from_config(&config.storage)?;
    let users = build_user_store(&config.database).await?;

    build_state(config, users, object_store)
}
