//! Poll entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the polls table.
#[derive(Debug, Clone, FromRow)]
pub struct PollEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub allow_anonymous_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PollEntity> for domain::models::Poll {
    fn from(e: PollEntity) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            is_public: e.is_public,
            allow_multiple_votes: e.allow_multiple_votes,
            allow_anonymous_votes: e.allow_anonymous_votes,
            expires_at: e.expires_at,
            created_by: e.created_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Database row mapping for the poll_options table.
#[derive(Debug, Clone, FromRow)]
pub struct PollOptionEntity {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub text: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl From<PollOptionEntity> for domain::models::PollOption {
    fn from(e: PollOptionEntity) -> Self {
        Self {
            id: e.id,
            poll_id: e.poll_id,
            text: e.text,
            order_index: e.order_index,
            created_at: e.created_at,
        }
    }
}

/// Database row mapping for the poll_stats view.
#[derive(Debug, Clone, FromRow)]
pub struct PollStatsEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub allow_anonymous_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub option_count: i64,
    pub total_votes: i64,
    pub unique_voters: i64,
    pub comment_count: i64,
    pub is_expired: bool,
}

impl From<PollStatsEntity> for domain::models::PollSummary {
    fn from(e: PollStatsEntity) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            is_public: e.is_public,
            allow_multiple_votes: e.allow_multiple_votes,
            allow_anonymous_votes: e.allow_anonymous_votes,
            expires_at: e.expires_at,
            created_by: e.created_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
            option_count: e.option_count,
            total_votes: e.total_votes,
            unique_voters: e.unique_voters,
            comment_count: e.comment_count,
            is_expired: e.is_expired,
        }
    }
}
