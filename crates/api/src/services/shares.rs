//! Share code issuance and resolution.

use chrono::{DateTime, Duration, Utc};
use domain::models::share::ShareRejection;
use domain::models::{Poll, PollOption, PollShare};
use domain::services::{authorize, Action, Actor};
use persistence::repositories::{PollRepository, ShareRepository};
use shared::crypto::{generate_share_code, is_share_code, normalize_share_code};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_share_issued;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("{}", .0.message())]
    Rejected(ShareRejection),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ShareError> for ApiError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::Rejected(ShareRejection::NotFound) => ApiError::NotFound(err.to_string()),
            ShareError::Rejected(ShareRejection::PollNotPublic) => {
                ApiError::Forbidden(err.to_string())
            }
            ShareError::Rejected(_) => ApiError::Validation(err.to_string()),
            ShareError::Database(e) => ApiError::from(e),
        }
    }
}

/// A share code that currently leads to a viewable poll.
#[derive(Debug, Clone)]
pub struct ResolvedShare {
    pub share: PollShare,
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

/// Result of a create request: an existing share is handed back unchanged.
#[derive(Debug, Clone)]
pub enum IssuedShare {
    Existing(PollShare),
    Created(PollShare),
}

pub struct ShareService {
    polls: PollRepository,
    shares: ShareRepository,
}

impl ShareService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            polls: PollRepository::new(pool.clone()),
            shares: ShareRepository::new(pool),
        }
    }

    async fn load_poll(&self, poll_id: Uuid) -> Result<Poll, ApiError> {
        self.polls
            .find_by_id(poll_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::NotFound("Poll not found".into()))
    }

    /// Lookup-or-create for the poll owner.
    pub async fn issue(
        &self,
        poll_id: Uuid,
        actor: Option<&Actor>,
        expires_at: Option<DateTime<Utc>>,
        limits: &LimitsConfig,
    ) -> Result<IssuedShare, ApiError> {
        let poll = self.load_poll(poll_id).await?;
        authorize(
            actor,
            Action::SharePoll {
                owner: poll.created_by,
            },
        )?;
        // Owner-only, so the caller is the poll creator from here on
        let user_id = poll.created_by;

        if !poll.is_public {
            return Err(ApiError::Validation("Only public polls can be shared".into()));
        }
        if expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(ApiError::Validation(
                "Expiration must be in the future".into(),
            ));
        }

        if let Some(existing) = self
            .shares
            .find_active_for_poll_by_creator(poll_id, user_id)
            .await?
        {
            return Ok(IssuedShare::Existing(existing.into()));
        }

        let recent = self
            .shares
            .count_created_since(user_id, Utc::now() - Duration::hours(1))
            .await?;
        if recent >= limits.share_codes_per_hour {
            return Err(ApiError::RateLimited(
                "Share code limit reached. Please try again later.".into(),
            ));
        }

        for attempt in 1..=limits.share_code_max_attempts {
            let code = generate_share_code();
            if self.shares.code_exists(&code).await? {
                tracing::debug!(attempt, "Share code collision");
                continue;
            }
            match self.shares.create(poll_id, &code, user_id, expires_at).await {
                Ok(entity) => {
                    record_share_issued();
                    tracing::info!(poll_id = %poll_id, user_id = %user_id, "Share code created");
                    return Ok(IssuedShare::Created(entity.into()));
                }
                Err(e) if persistence::is_unique_violation(&e) => {
                    tracing::debug!(attempt, "Share code collision on insert");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::Internal(format!(
            "Failed to generate a unique share code after {} attempts",
            limits.share_code_max_attempts
        )))
    }

    /// Checks, in order: code exists, share unexpired, poll unexpired, poll public.
    pub async fn resolve(&self, code: &str) -> Result<ResolvedShare, ShareError> {
        let code = normalize_share_code(code);
        if !is_share_code(&code) {
            return Err(ShareError::Rejected(ShareRejection::NotFound));
        }
        let share: PollShare = self
            .shares
            .find_by_code(&code)
            .await?
            .map(Into::into)
            .ok_or(ShareError::Rejected(ShareRejection::NotFound))?;

        let now = Utc::now();
        if share.is_expired_at(now) {
            return Err(ShareError::Rejected(ShareRejection::ShareExpired));
        }

        // The FK cascade removes shares with their poll, so a miss is a race
        let poll: Poll = self
            .polls
            .find_by_id(share.poll_id)
            .await?
            .map(Into::into)
            .ok_or(ShareError::Rejected(ShareRejection::NotFound))?;

        if poll.is_expired_at(now) {
            return Err(ShareError::Rejected(ShareRejection::PollExpired));
        }
        if !poll.is_public {
            return Err(ShareError::Rejected(ShareRejection::PollNotPublic));
        }

        let options = self
            .polls
            .find_options(poll.id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(ResolvedShare {
            share,
            poll,
            options,
        })
    }

    pub async fn stats(
        &self,
        poll_id: Uuid,
        actor: Option<&Actor>,
    ) -> Result<(i64, Option<DateTime<Utc>>), ApiError> {
        let poll = self.load_poll(poll_id).await?;
        authorize(
            actor,
            Action::ViewShareStats {
                owner: poll.created_by,
            },
        )?;
        let stats = self.shares.stats_for_poll(poll_id).await?;
        Ok((stats.share_count, stats.last_shared))
    }

    pub async fn delete(&self, code: &str, actor: Option<&Actor>) -> Result<(), ApiError> {
        let code = normalize_share_code(code);
        let share = self
            .shares
            .find_by_code(&code)
            .await?
            .ok_or_else(|| ApiError::NotFound(ShareRejection::NotFound.message().into()))?;

        authorize(
            actor,
            Action::DeleteShare {
                creator: share.created_by,
            },
        )?;

        self.shares.delete_by_code(&code).await?;
        tracing::info!(share_code = %code, poll_id = %share.poll_id, "Share code deleted");
        Ok(())
    }
}
