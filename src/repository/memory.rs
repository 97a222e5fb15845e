//! In-memory user store
//!
//! Used for local development (`database.backend = "memory"`) and tests.
//! A single write lock covers both uniqueness checks and the insert.

use crate::{
    error::{AppError, Identifier},
    models::user::{NewUser, User},
    repository::UserStore,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Users keyed by email
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.read().await.contains_key(email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.users.read().await.values().any(|u| u.username == username))
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.email) {
            return Err(AppError::DuplicateIdentifier(Identifier::Email));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateIdentifier(Identifier::Username));
        }

        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            access: user.access,
            created_at: Utc::now(),
        };
        users.insert(record.email.clone(), record.clone());

        Ok(record)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
