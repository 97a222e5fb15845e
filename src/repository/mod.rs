//! 用户存储层
//! 定义存储接口，提供 PostgreSQL 与内存两种实现

use crate::{
    error::AppError,
    models::user::{NewUser, User},
};
use async_trait::async_trait;

pub mod memory;
pub mod user_repo;

pub use memory::MemoryUserStore;
pub use user_repo::PgUserRepository;

/// 用户存储接口
///
/// `insert` 自身负责唯一性：邮箱或用户名重复时返回
/// [`AppError::DuplicateIdentifier`]，即使调用方事先检查过。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// 邮箱是否已被占用
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// 用户名是否已被占用
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// 插入新用户
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// 健康检查
    async fn health_check(&self) -> Result<(), AppError>;

    /// 后端名称（用于日志与就绪探针）
    fn backend_name(&self) -> &'static str;
}
