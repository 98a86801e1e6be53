//! Share code entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the poll_shares table.
#[derive(Debug, Clone, FromRow)]
pub struct PollShareEntity {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub share_code: String,
    pub created_by: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PollShareEntity> for domain::models::PollShare {
    fn from(e: PollShareEntity) -> Self {
        Self {
            id: e.id,
            poll_id: e.poll_id,
            share_code: e.share_code,
            created_by: e.created_by,
            expires_at: e.expires_at,
            created_at: e.created_at,
        }
    }
}

/// Aggregate over a poll's shares.
#[derive(Debug, Clone, FromRow)]
pub struct ShareStatsEntity {
    pub share_count: i64,
    pub last_shared: Option<DateTime<Utc>>,
}
