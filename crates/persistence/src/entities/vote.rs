//! Vote entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the votes table.
#[derive(Debug, Clone, FromRow)]
pub struct VoteEntity {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub option_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub allow_multiple: bool,
    pub created_at: DateTime<Utc>,
}

impl From<VoteEntity> for domain::models::Vote {
    fn from(e: VoteEntity) -> Self {
        Self {
            id: e.id,
            poll_id: e.poll_id,
            option_id: e.option_id,
            user_id: e.user_id,
            ip_address: e.ip_address,
            user_agent: e.user_agent,
            created_at: e.created_at,
        }
    }
}

/// `GROUP BY option_id` result.
#[derive(Debug, Clone, FromRow)]
pub struct OptionVoteCountEntity {
    pub option_id: Uuid,
    pub vote_count: i64,
}

impl From<OptionVoteCountEntity> for domain::models::OptionVoteCount {
    fn from(e: OptionVoteCountEntity) -> Self {
        Self {
            option_id: e.option_id,
            vote_count: e.vote_count,
        }
    }
}
