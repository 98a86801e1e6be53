//! Public site totals.

use axum::{extract::State, Json};
use domain::models::stats::SiteStats;
use persistence::repositories::{PollRepository, UserRepository, VoteRepository};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/stats
pub async fn site_stats(State(state): State<AppState>) -> Result<Json<SiteStats>, ApiError> {
    let total_polls = PollRepository::new(state.pool.clone()).count_public().await?;
    let total_votes = VoteRepository::new(state.pool.clone()).count_all().await?;
    let total_users = UserRepository::new(state.pool.clone()).count_all().await?;

    Ok(Json(SiteStats {
        total_polls,
        total_votes,
        total_users,
    }))
}
