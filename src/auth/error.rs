//! Failure kinds of the credential and token core

use thiserror::Error;

/// Errors raised by hashing, signing and verification.
///
/// A password mismatch is not an error: [`PasswordHasher::verify`] reports it
/// as `Ok(false)`.
///
/// [`PasswordHasher::verify`]: super::PasswordHasher::verify
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password verification failed: {0}")]
    Verification(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    ExpiredToken,
}

impl AuthError {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Hashing(_) => "hashing",
            AuthError::Verification(_) => "verification",
            AuthError::Signing(_) => "signing",
            AuthError::MalformedToken => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::ExpiredToken => "expired",
        }
    }
}
