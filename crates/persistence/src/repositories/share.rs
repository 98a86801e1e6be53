//! Share code repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PollShareEntity, ShareStatsEntity};
use crate::metrics::QueryTimer;

const SHARE_COLUMNS: &str = "id, poll_id, share_code, created_by, expires_at, created_at";

#[derive(Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exact lookup; callers normalize the code first.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PollShareEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_share_by_code");
        let result = sqlx::query_as::<_, PollShareEntity>(&format!(
            "SELECT {} FROM poll_shares WHERE share_code = $1",
            SHARE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Newest unexpired share this user already made for the poll.
    pub async fn find_active_for_poll_by_creator(
        &self,
        poll_id: Uuid,
        created_by: Uuid,
    ) -> Result<Option<PollShareEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_share");
        let result = sqlx::query_as::<_, PollShareEntity>(&format!(
            r#"
            SELECT {}
            FROM poll_shares
            WHERE poll_id = $1
              AND created_by = $2
              AND (expires_at IS NULL OR expires_at > NOW())
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SHARE_COLUMNS
        ))
        .bind(poll_id)
        .bind(created_by)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("share_code_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM poll_shares WHERE share_code = $1)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Shares created by a user since `since`, used for the hourly quota.
    pub async fn count_created_since(
        &self,
        created_by: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_recent_shares");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM poll_shares WHERE created_by = $1 AND created_at >= $2",
        )
        .bind(created_by)
        .bind(since)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inserts a share. A colliding code surfaces as a 23505 unique violation.
    pub async fn create(
        &self,
        poll_id: Uuid,
        code: &str,
        created_by: Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PollShareEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_share");
        let result = sqlx::query_as::<_, PollShareEntity>(&format!(
            r#"
            INSERT INTO poll_shares (poll_id, share_code, created_by, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SHARE_COLUMNS
        ))
        .bind(poll_id)
        .bind(code)
        .bind(created_by)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn stats_for_poll(&self, poll_id: Uuid) -> Result<ShareStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("share_stats_for_poll");
        let result = sqlx::query_as::<_, ShareStatsEntity>(
            r#"
            SELECT COUNT(*) AS share_count, MAX(created_at) AS last_shared
            FROM poll_shares
            WHERE poll_id = $1
            "#,
        )
        .bind(poll_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_by_code(&self, code: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_share");
        let result = sqlx::query("DELETE FROM poll_shares WHERE share_code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
