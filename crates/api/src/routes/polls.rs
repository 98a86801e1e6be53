//! Poll CRUD and listing endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::poll::{CreatePollRequest, PollListResponse, PollResponse, UpdatePollRequest};
use domain::models::{Poll, PollOption, PollSummary};
use domain::services::{authorize, Action, Actor};
use persistence::repositories::PollRepository;
use shared::pagination::{Page, PageParams};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalUserAuth, UserAuth};
use crate::middleware::metrics::record_poll_created;

/// Loads a poll the caller is allowed to see.
///
/// Private polls are reported as missing to anyone but the owner and moderators.
pub(crate) async fn load_visible_poll(
    repo: &PollRepository,
    poll_id: Uuid,
    actor: Option<&Actor>,
) -> Result<Poll, ApiError> {
    let poll: Poll = repo
        .find_by_id(poll_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Poll not found".into()))?;

    authorize(
        actor,
        Action::ViewPoll {
            owner: poll.created_by,
            is_public: poll.is_public,
        },
    )?;
    Ok(poll)
}

pub(crate) async fn load_options(
    repo: &PollRepository,
    poll_id: Uuid,
) -> Result<Vec<PollOption>, ApiError> {
    Ok(repo
        .find_options(poll_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

async fn load_owned_poll(repo: &PollRepository, poll_id: Uuid) -> Result<Poll, ApiError> {
    repo.find_by_id(poll_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Poll not found".into()))
}

fn page(state: &AppState, params: PageParams) -> Page {
    Page::from_params(
        params,
        state.config.limits.default_page_size,
        state.config.limits.max_page_size,
    )
}

/// GET /api/v1/polls
pub async fn list_public_polls(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PollListResponse>, ApiError> {
    let page = page(&state, params);
    let repo = PollRepository::new(state.pool.clone());

    let rows = repo.list_public(page.limit, page.offset()).await?;
    let total = repo.count_public().await?;

    Ok(Json(PollListResponse {
        data: rows.into_iter().map(PollSummary::from).collect(),
        pagination: page.meta(total),
    }))
}

/// GET /api/v1/users/me/polls
pub async fn list_my_polls(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(params): Query<PageParams>,
) -> Result<Json<PollListResponse>, ApiError> {
    let page = page(&state, params);
    let repo = PollRepository::new(state.pool.clone());

    let rows = repo
        .list_by_owner(auth.user_id, page.limit, page.offset())
        .await?;
    let total = repo.count_by_owner(auth.user_id).await?;

    Ok(Json(PollListResponse {
        data: rows.into_iter().map(PollSummary::from).collect(),
        pagination: page.meta(total),
    }))
}

/// POST /api/v1/polls
///
/// The poll row and its options are written separately; a failure between
/// the two leaves a poll without options.
pub async fn create_poll(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreatePollRequest>,
) -> Result<(StatusCode, Json<PollResponse>), ApiError> {
    let draft = request.into_draft(state.config.limits.max_poll_options)?;
    let repo = PollRepository::new(state.pool.clone());

    let poll: Poll = repo.create_poll(auth.user_id, &draft).await?.into();
    let options = repo
        .insert_options(poll.id, &draft.options)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    record_poll_created();
    tracing::info!(
        poll_id = %poll.id,
        user_id = %auth.user_id,
        options = draft.options.len(),
        "Poll created"
    );

    Ok((StatusCode::CREATED, Json(PollResponse::new(poll, options))))
}

/// GET /api/v1/polls/:poll_id
pub async fn get_poll(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<PollResponse>, ApiError> {
    let repo = PollRepository::new(state.pool.clone());
    let poll = load_visible_poll(&repo, poll_id, auth.actor().as_ref()).await?;
    let options = load_options(&repo, poll.id).await?;

    Ok(Json(PollResponse::new(poll, options)))
}

/// PUT /api/v1/polls/:poll_id
///
/// Replaces every field and the full option list.
pub async fn update_poll(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(poll_id): Path<Uuid>,
    Json(request): Json<UpdatePollRequest>,
) -> Result<Json<PollResponse>, ApiError> {
    let repo = PollRepository::new(state.pool.clone());
    let existing = load_owned_poll(&repo, poll_id).await?;
    authorize(
        Some(&auth.actor()),
        Action::EditPoll {
            owner: existing.created_by,
        },
    )?;

    let draft =
        request.into_update_draft(state.config.limits.max_poll_options, existing.expires_at)?;

    let poll: Poll = repo
        .update_poll(poll_id, &draft)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Poll not found".into()))?;
    let options = repo
        .replace_options(poll_id, &draft.options)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    tracing::info!(poll_id = %poll_id, user_id = %auth.user_id, "Poll updated");
    Ok(Json(PollResponse::new(poll, options)))
}

/// DELETE /api/v1/polls/:poll_id
pub async fn delete_poll(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = PollRepository::new(state.pool.clone());
    let poll = load_owned_poll(&repo, poll_id).await?;
    authorize(
        Some(&auth.actor()),
        Action::DeletePoll {
            owner: poll.created_by,
        },
    )?;

    if repo.delete_poll(poll_id).await? == 0 {
        return Err(ApiError::NotFound("Poll not found".into()));
    }

    tracing::info!(poll_id = %poll_id, user_id = %auth.user_id, "Poll deleted");
    Ok(StatusCode::NO_CONTENT)
}
