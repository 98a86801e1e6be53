//! First-admin bootstrap.
//!
//! On startup, creates an admin account from `admin.bootstrap_*` settings when
//! no user with that email exists yet. Running it again is a no-op.

use domain::models::UserRole;
use persistence::repositories::UserRepository;
use shared::password::{hash_password, PasswordError, MIN_PASSWORD_LENGTH};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

const DEFAULT_ADMIN_NAME: &str = "Administrator";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What `bootstrap_admin` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

fn check_settings(config: &AdminBootstrapConfig) -> Result<bool, BootstrapError> {
    if config.bootstrap_email.trim().is_empty() {
        return Ok(false);
    }
    if config.bootstrap_password.is_empty() {
        warn!("POLLS__ADMIN__BOOTSTRAP_EMAIL is set but the password is empty - skipping bootstrap");
        return Ok(false);
    }
    if config.bootstrap_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(BootstrapError::Config(format!(
            "bootstrap_password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(true)
}

pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if !check_settings(config)? {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let users = UserRepository::new(pool.clone());
    let email = config.bootstrap_email.trim().to_lowercase();

    if users.find_by_email(&email).await?.is_some() {
        info!("Bootstrap admin email already registered - skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    let name = match config.bootstrap_name.trim() {
        "" => DEFAULT_ADMIN_NAME,
        name => name,
    };
    let password_hash = hash_password(&config.bootstrap_password)?;

    let created = users
        .create_user(name, &email, &password_hash, UserRole::Admin.as_str())
        .await;
    let user = match created {
        Ok(user) => user,
        // Another instance bootstrapped in between
        Err(e) if persistence::is_unique_violation(&e) => {
            return Ok(BootstrapOutcome::AlreadyExists)
        }
        Err(e) => return Err(e.into()),
    };

    info!(email = %email, user_id = %user.id, "Bootstrap admin user created");
    warn!("SECURITY: remove POLLS__ADMIN__BOOTSTRAP_PASSWORD from configuration after initial setup");

    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(email: &str, password: &str) -> AdminBootstrapConfig {
        AdminBootstrapConfig {
            bootstrap_email: email.into(),
            bootstrap_password: password.into(),
            bootstrap_name: String::new(),
        }
    }

    #[test]
    fn test_unconfigured_is_skipped() {
        assert!(!check_settings(&AdminBootstrapConfig::default()).unwrap());
        assert!(!check_settings(&settings("root@example.com", "")).unwrap());
    }

    #[test]
    fn test_short_password_is_a_config_error() {
        assert!(matches!(
            check_settings(&settings("root@example.com", "abc")),
            Err(BootstrapError::Config(_))
        ));
    }

    #[test]
    fn test_complete_settings_accepted() {
        use fake::faker::internet::en::SafeEmail;
        use fake::Fake;

        let email: String = SafeEmail().fake();
        assert!(check_settings(&settings(&email, "changeme")).unwrap());
    }
}
