//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserRole;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    /// The CHECK constraint limits stored values; anything else degrades to `user`.
    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or_default()
    }
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        let role = entity.role();
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            password_hash: entity.password_hash,
            role,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Row used for role-count aggregation.
#[derive(Debug, Clone, FromRow)]
pub struct RoleCountEntity {
    pub role: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(role: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(entity("admin").role(), UserRole::Admin);
        assert_eq!(entity("moderator").role(), UserRole::Moderator);
        assert_eq!(entity("bogus").role(), UserRole::User);
    }

    #[test]
    fn test_into_domain() {
        let user: domain::models::User = entity("moderator").into();
        assert_eq!(user.role, UserRole::Moderator);
        assert_eq!(user.email, "grace@example.com");
    }
}
