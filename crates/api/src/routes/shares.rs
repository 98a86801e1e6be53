//! Share code endpoints and the public share redirect.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use domain::models::poll::PollResponse;
use domain::models::share::{
    CreateShareRequest, ResolvedShareResponse, ShareResponse, ShareStatsResponse,
    ShareValidationResponse,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::shares::{IssuedShare, ShareError};
use crate::services::ShareService;

/// An empty body means no expiry; anything else must be a valid request.
pub(crate) fn parse_share_request(body: &[u8]) -> Result<CreateShareRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateShareRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid share request: {}", e)))
}

/// POST /api/v1/polls/:poll_id/shares
///
/// 201 for a new code, 200 when the caller's live code is handed back.
pub async fn create_share(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(poll_id): Path<Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<ShareResponse>), ApiError> {
    let request = parse_share_request(&body)?;

    let issued = ShareService::new(state.pool.clone())
        .issue(
            poll_id,
            Some(&auth.actor()),
            request.expires_at,
            &state.config.limits,
        )
        .await?;

    let (status, share) = match issued {
        IssuedShare::Created(share) => (StatusCode::CREATED, share),
        IssuedShare::Existing(share) => (StatusCode::OK, share),
    };
    Ok((
        status,
        Json(ShareResponse::new(share, &state.config.server.app_base_url)),
    ))
}

/// GET /api/v1/polls/:poll_id/shares/stats
pub async fn share_stats(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<ShareStatsResponse>, ApiError> {
    let (share_count, last_shared) = ShareService::new(state.pool.clone())
        .stats(poll_id, Some(&auth.actor()))
        .await?;

    Ok(Json(ShareStatsResponse {
        poll_id,
        share_count,
        last_shared,
    }))
}

/// GET /api/v1/shares/:code
pub async fn resolve_share(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ResolvedShareResponse>, ApiError> {
    let resolved = ShareService::new(state.pool.clone()).resolve(&code).await?;

    Ok(Json(ResolvedShareResponse {
        share_code: resolved.share.share_code,
        poll: PollResponse::new(resolved.poll, resolved.options),
    }))
}

/// GET /api/v1/shares/:code/validate
pub async fn validate_share(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ShareValidationResponse>, ApiError> {
    match ShareService::new(state.pool.clone()).resolve(&code).await {
        Ok(resolved) => Ok(Json(ShareValidationResponse {
            is_valid: true,
            poll_id: Some(resolved.poll.id),
        })),
        Err(ShareError::Rejected(_)) => Ok(Json(ShareValidationResponse {
            is_valid: false,
            poll_id: None,
        })),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/v1/shares/:code
pub async fn delete_share(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    ShareService::new(state.pool.clone())
        .delete(&code, Some(&auth.actor()))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn error_redirect_target(message: &str) -> String {
    format!("/polls?error={}", urlencoding::encode(message))
}

/// GET /share/:code
///
/// Browser entry point: sends the visitor to the poll page or back to the
/// poll list with the rejection reason.
pub async fn share_redirect(State(state): State<AppState>, Path(code): Path<String>) -> Redirect {
    match ShareService::new(state.pool.clone()).resolve(&code).await {
        Ok(resolved) => Redirect::temporary(&format!("/polls/{}", resolved.poll.id)),
        Err(ShareError::Rejected(rejection)) => {
            Redirect::temporary(&error_redirect_target(rejection.message()))
        }
        Err(ShareError::Database(e)) => {
            tracing::error!(error = %e, "Share redirect lookup failed");
            Redirect::temporary(&error_redirect_target("Failed to access shared poll"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_redirect_is_percent_encoded() {
        assert_eq!(
            error_redirect_target("Share code has expired"),
            "/polls?error=Share%20code%20has%20expired"
        );
        assert_eq!(
            error_redirect_target("a&b=c"),
            "/polls?error=a%26b%3Dc"
        );
    }

    #[test]
    fn test_empty_share_body_means_no_expiry() {
        assert!(parse_share_request(b"").unwrap().expires_at.is_none());
        assert!(parse_share_request(b"  \n").unwrap().expires_at.is_none());
        assert!(parse_share_request(b"{}").unwrap().expires_at.is_none());
    }

    #[test]
    fn test_share_body_with_expiry() {
        let request = parse_share_request(br#"{"expiresAt":"2030-01-01T00:00:00Z"}"#).unwrap();
        assert!(request.expires_at.is_some());
    }

    #[test]
    fn test_malformed_share_body_is_rejected() {
        assert!(matches!(
            parse_share_request(br#"{"expiresAt":"tomorrow"}"#),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            parse_share_request(b"not json"),
            Err(ApiError::Validation(_))
        ));
    }
}
