//! Voting and results endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::vote::{CastVoteRequest, CastVoteResponse, MyVotesResponse, PollResults};
use domain::models::OptionVoteCount;
use domain::services::tally;
use persistence::repositories::{PollRepository, VoteRepository};
use uuid::Uuid;
use validator::Validate;

use super::polls::{load_options, load_visible_poll};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ClientInfo, OptionalUserAuth, UserAuth};
use crate::services::VoteService;

/// POST /api/v1/polls/:poll_id/votes
pub async fn cast_vote(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    client: ClientInfo,
    Path(poll_id): Path<Uuid>,
    Json(request): Json<CastVoteRequest>,
) -> Result<(StatusCode, Json<CastVoteResponse>), ApiError> {
    request.validate()?;

    let actor = auth.actor();
    let response = VoteService::new(state.pool.clone())
        .cast(poll_id, actor.as_ref(), &client, &request.option_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/polls/:poll_id/votes/me
pub async fn get_my_votes(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<MyVotesResponse>, ApiError> {
    let polls = PollRepository::new(state.pool.clone());
    load_visible_poll(&polls, poll_id, Some(&auth.actor())).await?;

    let option_ids = VoteRepository::new(state.pool.clone())
        .user_option_ids(poll_id, auth.user_id)
        .await?;

    Ok(Json(MyVotesResponse {
        poll_id,
        has_voted: !option_ids.is_empty(),
        option_ids,
    }))
}

/// GET /api/v1/polls/:poll_id/results
pub async fn get_results(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<PollResults>, ApiError> {
    let polls = PollRepository::new(state.pool.clone());
    let poll = load_visible_poll(&polls, poll_id, auth.actor().as_ref()).await?;
    let options = load_options(&polls, poll.id).await?;

    let counts: Vec<OptionVoteCount> = VoteRepository::new(state.pool.clone())
        .count_by_option(poll.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(tally(poll.id, &options, &counts)))
}
