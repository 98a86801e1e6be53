//! Ballot checks run before any vote row is written.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::models::poll::Poll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BallotRejection {
    #[error("At least one option must be selected")]
    NoOptions,
    #[error("This poll has expired")]
    PollExpired,
    #[error("Login required to vote on this poll")]
    LoginRequired,
    #[error("This poll only allows single votes")]
    MultipleNotAllowed,
    #[error("Selected option does not belong to this poll")]
    UnknownOption,
}

/// Validates a ballot against the poll and returns the de-duplicated option ids
/// in submission order.
pub fn check_ballot(
    poll: &Poll,
    poll_option_ids: &[Uuid],
    requested: &[Uuid],
    voter: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Vec<Uuid>, BallotRejection> {
    let mut seen = HashSet::new();
    let chosen: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if chosen.is_empty() {
        return Err(BallotRejection::NoOptions);
    }
    if poll.is_expired_at(now) {
        return Err(BallotRejection::PollExpired);
    }
    if voter.is_none() && !poll.allow_anonymous_votes {
        return Err(BallotRejection::LoginRequired);
    }
    if chosen.len() > 1 && !poll.allow_multiple_votes {
        return Err(BallotRejection::MultipleNotAllowed);
    }
    if chosen.iter().any(|id| !poll_option_ids.contains(id)) {
        return Err(BallotRejection::UnknownOption);
    }

    Ok(chosen)
}
