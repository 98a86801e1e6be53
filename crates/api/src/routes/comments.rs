//! Comment thread, moderation and reaction endpoints.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::comment::{
    CommentResponse, CommentThreadResponse, CreateCommentRequest, ReactToCommentRequest,
    ReactionResponse, ReportCommentRequest, SetVisibilityRequest, UpdateCommentRequest,
};
use domain::models::{Comment, CommentDetails, Poll, ReactionType};
use domain::services::{authorize, build_comment_tree, can, count_nodes, Action};
use persistence::repositories::{CommentRepository, PollRepository};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::polls::load_visible_poll;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalUserAuth, UserAuth};
use crate::middleware::metrics::record_comment_created;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    #[serde(default)]
    pub include_hidden: bool,
}

async fn load_comment(repo: &CommentRepository, comment_id: Uuid) -> Result<Comment, ApiError> {
    repo.find_by_id(comment_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))
}

/// Loads a comment whose poll the caller may view. Comments on polls the
/// caller cannot see are reported as missing.
async fn load_reachable_comment(
    state: &AppState,
    repo: &CommentRepository,
    comment_id: Uuid,
    auth: &UserAuth,
) -> Result<Comment, ApiError> {
    let comment = load_comment(repo, comment_id).await?;
    let polls = PollRepository::new(state.pool.clone());
    match load_visible_poll(&polls, comment.poll_id, Some(&auth.actor())).await {
        Ok(_) => Ok(comment),
        Err(ApiError::NotFound(_)) => Err(ApiError::NotFound("Comment not found".into())),
        Err(e) => Err(e),
    }
}

/// GET /api/v1/polls/:poll_id/comments
///
/// `includeHidden` is ignored unless the caller moderates.
pub async fn list_comments(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(poll_id): Path<Uuid>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<CommentThreadResponse>, ApiError> {
    let actor = auth.actor();
    let polls = PollRepository::new(state.pool.clone());
    let poll = load_visible_poll(&polls, poll_id, actor.as_ref()).await?;

    let include_hidden =
        query.include_hidden && can(actor.as_ref(), Action::ModerateComments);

    let flat: Vec<CommentDetails> = CommentRepository::new(state.pool.clone())
        .list_for_poll(poll.id, auth.user_id(), include_hidden)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let comments = build_comment_tree(flat);
    Ok(Json(CommentThreadResponse {
        poll_id: poll.id,
        total: count_nodes(&comments),
        comments,
    }))
}

/// POST /api/v1/polls/:poll_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(poll_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    request.validate()?;

    let poll: Poll = PollRepository::new(state.pool.clone())
        .find_by_id(poll_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Poll not found".into()))?;

    authorize(
        Some(&auth.actor()),
        Action::CommentOnPoll {
            owner: poll.created_by,
            is_public: poll.is_public,
        },
    )?;

    let repo = CommentRepository::new(state.pool.clone());

    if let Some(parent_id) = request.parent_id {
        let parent = repo.find_by_id(parent_id).await?;
        if !parent.is_some_and(|p| p.poll_id == poll_id && p.is_visible) {
            return Err(ApiError::NotFound("Parent comment not found".into()));
        }
    }

    let comment: Comment = repo
        .create(
            poll_id,
            auth.user_id,
            request.parent_id,
            request.content.trim(),
        )
        .await?
        .into();

    record_comment_created();
    tracing::info!(
        comment_id = %comment.id,
        poll_id = %poll_id,
        user_id = %auth.user_id,
        reply = comment.parent_id.is_some(),
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// PATCH /api/v1/comments/:comment_id
pub async fn update_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    request.validate()?;

    let repo = CommentRepository::new(state.pool.clone());
    let existing = load_reachable_comment(&state, &repo, comment_id, &auth).await?;

    authorize(
        Some(&auth.actor()),
        Action::EditComment {
            author: existing.user_id,
        },
    )?;
    if !existing.is_visible {
        return Err(ApiError::Forbidden("Cannot edit hidden comment".into()));
    }

    let comment: Comment = repo
        .update_content(comment_id, request.content.trim())
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    Ok(Json(comment.into()))
}

/// DELETE /api/v1/comments/:comment_id
///
/// Hard delete; replies go with it.
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = CommentRepository::new(state.pool.clone());
    let existing = load_comment(&repo, comment_id).await?;

    authorize(
        Some(&auth.actor()),
        Action::DeleteComment {
            author: existing.user_id,
        },
    )?;

    repo.delete(comment_id).await?;
    tracing::info!(comment_id = %comment_id, user_id = %auth.user_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/comments/:comment_id/visibility
pub async fn set_comment_visibility(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    authorize(Some(&auth.actor()), Action::ModerateComments)?;

    let comment: Comment = CommentRepository::new(state.pool.clone())
        .set_visibility(comment_id, request.is_visible)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    tracing::info!(
        comment_id = %comment_id,
        moderator_id = %auth.user_id,
        is_visible = request.is_visible,
        "Comment visibility changed"
    );
    Ok(Json(comment.into()))
}

/// POST /api/v1/comments/:comment_id/reports
pub async fn report_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<ReportCommentRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(Some(&auth.actor()), Action::ReportComment)?;
    request.validate()?;

    let repo = CommentRepository::new(state.pool.clone());
    load_reachable_comment(&state, &repo, comment_id, &auth).await?;

    let already = || ApiError::Conflict("You have already reported this comment".into());
    if repo.has_reported(comment_id, auth.user_id).await? {
        return Err(already());
    }

    match repo
        .report(comment_id, auth.user_id, request.reason.trim())
        .await
    {
        Ok(_) => {}
        Err(e) if persistence::is_unique_violation(&e) => return Err(already()),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(comment_id = %comment_id, user_id = %auth.user_id, "Comment reported");
    Ok(StatusCode::CREATED)
}

/// PUT /api/v1/comments/:comment_id/reaction
///
/// Sending the caller's current reaction again removes it.
pub async fn react_to_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<ReactToCommentRequest>,
) -> Result<Json<ReactionResponse>, ApiError> {
    authorize(Some(&auth.actor()), Action::ReactToComment)?;

    let repo = CommentRepository::new(state.pool.clone());
    load_reachable_comment(&state, &repo, comment_id, &auth).await?;

    let current = repo
        .toggle_reaction(comment_id, auth.user_id, request.reaction_type.as_str())
        .await?;
    let counts = repo.reaction_counts(comment_id).await?;

    Ok(Json(ReactionResponse {
        comment_id,
        reaction_type: current.and_then(|r| ReactionType::from_str(&r).ok()),
        like_count: counts.like_count,
        dislike_count: counts.dislike_count,
    }))
}
