//! Authentication: credential hashing, token issuance/verification and the
//! session middleware that gates protected routes.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod secret;

pub use error::AuthError;
pub use jwt::{Claims, TokenIssuer, TokenVerifier};
pub use middleware::{extract_token, session_middleware, Identity};
pub use password::PasswordHasher;
pub use secret::SigningSecret;
