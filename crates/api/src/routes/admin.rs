//! Administration endpoints: user roles, dashboard totals and the
//! comment moderation queue.

use axum::{extract::State, Json};
use domain::models::comment::ReportedComment;
use domain::models::stats::{AdminStats, PollCounts, UserCounts};
use domain::models::user::UserResponse;
use domain::models::{User, UserRole};
use domain::services::{authorize, Action};
use persistence::entities::RoleCountEntity;
use persistence::repositories::{CommentRepository, PollRepository, UserRepository, VoteRepository};
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Maximum entries returned by the moderation queue.
const REPORTED_COMMENTS_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub user_id: Uuid,
    pub role: String,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    authorize(Some(&auth.actor()), Action::ManageUsers)?;

    let users = UserRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(|e| UserResponse::from(User::from(e)))
        .collect();

    Ok(Json(users))
}

/// PATCH /api/v1/admin/users
pub async fn update_user_role(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(
        Some(&auth.actor()),
        Action::ChangeRole {
            target: request.user_id,
        },
    )?;

    let role = UserRole::from_str(&request.role)
        .map_err(|_| ApiError::Validation("Invalid role".into()))?;

    let user: User = UserRepository::new(state.pool.clone())
        .update_role(request.user_id, role.as_str())
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(
        admin_id = %auth.user_id,
        target_user_id = %user.id,
        role = %role,
        "User role changed"
    );

    Ok(Json(user.into()))
}

fn user_counts(rows: &[RoleCountEntity]) -> UserCounts {
    let mut counts = UserCounts::default();
    for row in rows {
        counts.total += row.count;
        match UserRole::from_str(&row.role) {
            Ok(UserRole::Admin) => counts.admins += row.count,
            Ok(UserRole::Moderator) => counts.moderators += row.count,
            // Unknown roles are treated as plain users, matching UserEntity::role
            Ok(UserRole::User) | Err(_) => counts.users += row.count,
        }
    }
    counts
}

/// GET /api/v1/admin/stats
pub async fn admin_stats(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<AdminStats>, ApiError> {
    authorize(Some(&auth.actor()), Action::ViewAdminStats)?;

    let roles = UserRepository::new(state.pool.clone()).count_by_role().await?;
    let polls = PollRepository::new(state.pool.clone());
    let total_polls = polls.count_all().await?;
    let public_polls = polls.count_public().await?;
    let total_votes = VoteRepository::new(state.pool.clone()).count_all().await?;
    let comments = CommentRepository::new(state.pool.clone()).stats().await?;

    Ok(Json(AdminStats {
        users: user_counts(&roles),
        polls: PollCounts {
            total: total_polls,
            public: public_polls,
            private: total_polls - public_polls,
        },
        total_votes,
        comments,
    }))
}

/// GET /api/v1/admin/comments/reported
pub async fn list_reported_comments(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<ReportedComment>>, ApiError> {
    authorize(Some(&auth.actor()), Action::ModerateComments)?;

    let comments = CommentRepository::new(state.pool.clone())
        .list_reported(REPORTED_COMMENTS_LIMIT)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(comments))
}
