//! Bearer JWT extractors.
//!
//! The token proves identity; the role comes from the users table on every
//! request so role changes apply immediately.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use domain::models::UserRole;
use domain::services::Actor;
use persistence::repositories::UserRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl UserAuth {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

/// Caller that may be anonymous. Invalid tokens are treated as absent.
#[derive(Debug, Clone)]
pub struct OptionalUserAuth(pub Option<UserAuth>);

impl OptionalUserAuth {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(UserAuth::actor)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|auth| auth.user_id)
    }
}

pub(crate) fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header format".into()))?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format".into(),
        )),
    }
}

async fn resolve(state: &AppState, token: &str) -> Result<UserAuth, ApiError> {
    let claims = state.jwt.validate_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;
    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(UserAuth {
        user_id,
        role: user.role(),
    })
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;
        resolve(state, token).await
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(Some(token)) = bearer_token(parts) else {
            return Ok(OptionalUserAuth(None));
        };
        match resolve(state, token).await {
            Ok(auth) => Ok(OptionalUserAuth(Some(auth))),
            Err(ApiError::Unauthorized(_)) => Ok(OptionalUserAuth(None)),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_absent() {
        assert!(matches!(bearer_token(&parts_with(None)), Ok(None)));
    }

    #[test]
    fn test_bearer_token_present() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(bearer_token(&parts_with(Some("Bearer "))).is_err());
    }

    #[test]
    fn test_actor_conversion() {
        let auth = UserAuth {
            user_id: Uuid::new_v4(),
            role: UserRole::Moderator,
        };
        let actor = auth.actor();
        assert_eq!(actor.user_id, auth.user_id);
        assert_eq!(actor.role, UserRole::Moderator);
        assert_eq!(OptionalUserAuth(Some(auth)).user_id(), Some(actor.user_id));
        assert!(OptionalUserAuth(None).actor().is_none());
    }
}
