//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Object keys the user has been granted
    pub access: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// New user record, ready to insert
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub access: Vec<String>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 128, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    #[serde(default, alias = "accessList")]
    pub access: Vec<String>,
}

/// Create user response
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, username: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Alice".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: "TestPass123".to_string(),
            access: vec![],
        }
    }

    #[test]
    fn test_create_user_validation() {
        assert!(request("alice@example.com", "alice").validate().is_ok());
        assert!(request("not-an-email", "alice").validate().is_err());
        assert!(request("alice@example.com", "").validate().is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            access: vec![],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice@example.com");
    }

    #[test]
    fn test_create_user_response_wire_name() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(CreateUserResponse {
            message: "User created successfully".to_string(),
            user_id: id,
        })
        .unwrap();
        assert_eq!(json["userID"], id.to_string());
    }
}
