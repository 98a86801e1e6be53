//! Vote casting pipeline.
//!
//! Ballot rules run first (pure), then the duplicate check, the database
//! rate-limit function and finally the transactional insert.

use chrono::Utc;
use domain::models::vote::CastVoteResponse;
use domain::models::{Poll, PollOption};
use domain::services::{authorize, check_ballot, Action, Actor, BallotRejection};
use persistence::repositories::{PollRepository, VoteRepository, VoterContext};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::ClientInfo;
use crate::middleware::metrics::record_votes_cast;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Poll not found")]
    PollNotFound,

    #[error(transparent)]
    Rejected(#[from] BallotRejection),

    #[error("Too many votes. Please wait before voting again.")]
    RateLimited,

    #[error("You have already voted on this poll")]
    AlreadyVoted,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::PollNotFound => ApiError::NotFound(err.to_string()),
            VoteError::Rejected(BallotRejection::LoginRequired) => {
                ApiError::Unauthorized(err.to_string())
            }
            VoteError::Rejected(_) => ApiError::Validation(err.to_string()),
            VoteError::RateLimited => ApiError::RateLimited(err.to_string()),
            VoteError::AlreadyVoted => ApiError::Conflict(err.to_string()),
            VoteError::Database(e) => ApiError::from(e),
        }
    }
}

pub struct VoteService {
    polls: PollRepository,
    votes: VoteRepository,
}

impl VoteService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            polls: PollRepository::new(pool.clone()),
            votes: VoteRepository::new(pool),
        }
    }

    async fn load_votable_poll(
        &self,
        poll_id: Uuid,
        actor: Option<&Actor>,
    ) -> Result<(Poll, Vec<PollOption>), VoteError> {
        let poll: Poll = self
            .polls
            .find_by_id(poll_id)
            .await?
            .map(Into::into)
            .ok_or(VoteError::PollNotFound)?;

        authorize(
            actor,
            Action::ViewPoll {
                owner: poll.created_by,
                is_public: poll.is_public,
            },
        )
        .map_err(|_| VoteError::PollNotFound)?;

        let options = self
            .polls
            .find_options(poll_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((poll, options))
    }

    pub async fn cast(
        &self,
        poll_id: Uuid,
        actor: Option<&Actor>,
        client: &ClientInfo,
        option_ids: &[Uuid],
    ) -> Result<CastVoteResponse, VoteError> {
        let (poll, options) = self.load_votable_poll(poll_id, actor).await?;
        let voter = actor.map(|a| a.user_id);

        let option_set: Vec<Uuid> = options.iter().map(|o| o.id).collect();
        let chosen = check_ballot(&poll, &option_set, option_ids, voter, Utc::now())?;

        if let Some(user_id) = voter {
            if self.votes.has_user_voted(poll_id, user_id).await? {
                return Err(VoteError::AlreadyVoted);
            }
        }

        if !self
            .votes
            .check_rate_limit(poll_id, &client.ip_address, voter)
            .await?
        {
            tracing::info!(poll_id = %poll_id, ip = %client.ip_address, "Vote rate limit hit");
            return Err(VoteError::RateLimited);
        }

        let context = VoterContext {
            user_id: voter,
            ip_address: &client.ip_address,
            user_agent: client.user_agent.as_deref(),
        };
        let rows = match self
            .votes
            .insert_ballot(poll_id, &chosen, poll.allow_multiple_votes, &context)
            .await
        {
            Ok(rows) => rows,
            Err(e) if persistence::is_unique_violation(&e) => return Err(VoteError::AlreadyVoted),
            Err(e) => return Err(e.into()),
        };

        record_votes_cast(rows.len(), voter.is_none());
        tracing::info!(
            poll_id = %poll_id,
            user_id = ?voter,
            options = chosen.len(),
            "Vote cast"
        );

        let voted_at = rows.first().map(|r| r.created_at).unwrap_or_else(Utc::now);
        Ok(CastVoteResponse {
            poll_id,
            option_ids: chosen,
            voted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_error_mapping() {
        assert!(matches!(
            ApiError::from(VoteError::AlreadyVoted),
            ApiError::Conflict(msg) if msg == "You have already voted on this poll"
        ));
        assert!(matches!(
            ApiError::from(VoteError::Rejected(BallotRejection::LoginRequired)),
            ApiError::Unauthorized(msg) if msg == "Login required to vote on this poll"
        ));
        assert!(matches!(
            ApiError::from(VoteError::Rejected(BallotRejection::PollExpired)),
            ApiError::Validation(msg) if msg == "This poll has expired"
        ));
        assert!(matches!(
            ApiError::from(VoteError::RateLimited),
            ApiError::RateLimited(_)
        ));
        assert!(matches!(
            ApiError::from(VoteError::PollNotFound),
            ApiError::NotFound(_)
        ));
    }
}
