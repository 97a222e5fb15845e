//! Process-wide token signing secret

use crate::{config::SecurityConfig, error::AppError};
use secrecy::{ExposeSecret, Secret, SecretVec};
use std::path::Path;

/// HMAC key shared by [`TokenIssuer`](super::TokenIssuer) and
/// [`TokenVerifier`](super::TokenVerifier).
///
/// Loaded once at startup and never mutated. The key material is the file
/// *contents*; trailing whitespace (usually a final newline) is dropped.
pub struct SigningSecret {
    key: SecretVec<u8>,
}

impl SigningSecret {
    /// Minimum key length in bytes for HS256
    pub const MIN_LEN: usize = 32;

    /// Build a secret from raw key bytes
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self, AppError> {
        while bytes.last().is_some_and(|b| b.is_ascii_whitespace()) {
            bytes.pop();
        }

        if bytes.len() < Self::MIN_LEN {
            return Err(AppError::Config(format!(
                "JWT secret too short (min {} bytes)",
                Self::MIN_LEN
            )));
        }

        Ok(Self {
            key: Secret::new(bytes),
        })
    }

    /// Read the secret from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::Config(format!("Failed to read JWT secret file {}: {}", path.display(), e))
        })?;

        Self::from_bytes(bytes)
    }

    /// Load from the security config; the secret file takes precedence over
    /// an inline secret.
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        if let Some(path) = &config.jwt_secret_file {
            tracing::debug!(path = %path, "Loading JWT secret from file");
            return Self::from_file(path);
        }

        match &config.jwt_secret {
            Some(secret) => Self::from_bytes(secret.expose_secret().as_bytes().to_vec()),
            None => Err(AppError::Config("No JWT secret configured".to_string())),
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.key.expose_secret()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}
