//! Social preview metadata.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::preview::PollPreview;
use domain::services::build_poll_preview;
use persistence::repositories::PollRepository;
use uuid::Uuid;

use super::polls::load_visible_poll;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::OptionalUserAuth;

/// GET /api/v1/polls/:poll_id/preview
pub async fn poll_preview(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<PollPreview>, ApiError> {
    let repo = PollRepository::new(state.pool.clone());
    let poll = load_visible_poll(&repo, poll_id, auth.actor().as_ref()).await?;

    let (option_count, vote_count) = repo
        .find_stats(poll.id)
        .await?
        .map(|s| (s.option_count, s.total_votes))
        .unwrap_or_default();

    Ok(Json(build_poll_preview(
        &poll,
        option_count,
        vote_count,
        &state.config.server.app_base_url,
    )))
}
