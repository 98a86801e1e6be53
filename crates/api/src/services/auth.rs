//! Account registration, login and token refresh.

use domain::models::{User, UserRole};
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError, TokenPair};
use shared::password::{hash_password, verify_against_dummy, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::config::JwtAuthConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    EmailAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidRefreshToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            AuthError::TokenError(_) | AuthError::PasswordError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// A user together with freshly issued tokens.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub tokens: TokenPair,
}

/// Converts literal `\n` sequences in PEM keys from env vars into newlines.
pub fn normalize_pem_key(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

/// Builds the RS256 signer/verifier from configuration.
pub fn jwt_from_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
    JwtConfig::from_rsa_pem(
        &normalize_pem_key(&config.private_key),
        &normalize_pem_key(&config.public_key),
        config.access_token_expiry_secs,
        config.refresh_token_expiry_secs,
        config.leeway_secs,
    )
}

pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    fn issue(&self, user: User) -> Result<AuthResult, AuthError> {
        let tokens = self.jwt.issue_pair(user.id, user.role.as_str())?;
        Ok(AuthResult { user, tokens })
    }

    /// Creates a `user`-role account. The email is stored lowercased.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResult, AuthError> {
        let email = email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        // A concurrent registration can still win the race on the unique index
        let user = match self
            .users
            .create_user(name.trim(), &email, &password_hash, UserRole::User.as_str())
            .await
        {
            Ok(entity) => User::from(entity),
            Err(e) if persistence::is_unique_violation(&e) => {
                return Err(AuthError::EmailAlreadyExists)
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "User registered");
        self.issue(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let Some(entity) = self.users.find_by_email(email.trim()).await? else {
            verify_against_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &entity.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let user = User::from(entity);
        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    /// Exchanges a refresh token for a new pair carrying the user's current role.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or(AuthError::InvalidRefreshToken)?;

        self.issue(user)
    }

    pub async fn current_user(&self, user_id: uuid::Uuid) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pem_key_expands_escaped_newlines() {
        let raw = "\"-----BEGIN PUBLIC KEY-----\\nABC\\n-----END PUBLIC KEY-----\"";
        assert_eq!(
            normalize_pem_key(raw),
            "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----"
        );
    }

    #[test]
    fn test_normalize_pem_key_keeps_real_newlines() {
        let raw = "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----";
        assert_eq!(normalize_pem_key(raw), raw);
    }

    #[test]
    fn test_jwt_from_config_rejects_garbage_keys() {
        let config = JwtAuthConfig {
            private_key: "not a key".into(),
            public_key: "not a key".into(),
            access_token_expiry_secs: 60,
            refresh_token_expiry_secs: 120,
            leeway_secs: 0,
        };
        assert!(matches!(
            jwt_from_config(&config),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::EmailAlreadyExists),
            ApiError::Conflict(msg) if msg == "User with this email already exists"
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(msg) if msg == "Invalid email or password"
        ));
        assert!(matches!(
            ApiError::from(AuthError::UserNotFound),
            ApiError::NotFound(_)
        ));
    }
}
