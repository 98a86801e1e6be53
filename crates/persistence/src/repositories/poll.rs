//! Poll repository for database operations.

use domain::models::PollDraft;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PollEntity, PollOptionEntity, PollStatsEntity};
use crate::metrics::QueryTimer;

const POLL_COLUMNS: &str = "id, title, description, is_public, allow_multiple_votes, \
    allow_anonymous_votes, expires_at, created_by, created_at, updated_at";

const STATS_COLUMNS: &str = "id, title, description, is_public, allow_multiple_votes, \
    allow_anonymous_votes, expires_at, created_by, created_at, updated_at, option_count, \
    total_votes, unique_voters, comment_count, is_expired";

/// Repository for polls and their options.
#[derive(Clone)]
pub struct PollRepository {
    pool: PgPool,
}

impl PollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the poll row only. Options are written by [`Self::insert_options`].
    pub async fn create_poll(
        &self,
        created_by: Uuid,
        draft: &PollDraft,
    ) -> Result<PollEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_poll");
        let result = sqlx::query_as::<_, PollEntity>(&format!(
            r#"
            INSERT INTO polls (title, description, is_public, allow_multiple_votes,
                               allow_anonymous_votes, expires_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            POLL_COLUMNS
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.is_public)
        .bind(draft.allow_multiple_votes)
        .bind(draft.allow_anonymous_votes)
        .bind(draft.expires_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inserts options with `order_index` equal to their position in `texts`.
    pub async fn insert_options(
        &self,
        poll_id: Uuid,
        texts: &[String],
    ) -> Result<Vec<PollOptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_poll_options");
        let result = sqlx::query_as::<_, PollOptionEntity>(
            r#"
            INSERT INTO poll_options (poll_id, text, order_index)
            SELECT $1, t.text, (t.ord - 1)::int
            FROM UNNEST($2::text[]) WITH ORDINALITY AS t(text, ord)
            RETURNING id, poll_id, text, order_index, created_at
            "#,
        )
        .bind(poll_id)
        .bind(texts)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map(|mut rows| {
            rows.sort_by_key(|o| o.order_index);
            rows
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PollEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_poll_by_id");
        let result = sqlx::query_as::<_, PollEntity>(&format!(
            "SELECT {} FROM polls WHERE id = $1",
            POLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_options(&self, poll_id: Uuid) -> Result<Vec<PollOptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_poll_options");
        let result = sqlx::query_as::<_, PollOptionEntity>(
            r#"
            SELECT id, poll_id, text, order_index, created_at
            FROM poll_options
            WHERE poll_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_poll(
        &self,
        id: Uuid,
        draft: &PollDraft,
    ) -> Result<Option<PollEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_poll");
        let result = sqlx::query_as::<_, PollEntity>(&format!(
            r#"
            UPDATE polls
            SET title = $2, description = $3, is_public = $4, allow_multiple_votes = $5,
                allow_anonymous_votes = $6, expires_at = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POLL_COLUMNS
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.is_public)
        .bind(draft.allow_multiple_votes)
        .bind(draft.allow_anonymous_votes)
        .bind(draft.expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes every option of the poll and inserts `texts` as the new list.
    ///
    /// Votes on removed options are cascaded away by the foreign key.
    pub async fn replace_options(
        &self,
        poll_id: Uuid,
        texts: &[String],
    ) -> Result<Vec<PollOptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("replace_poll_options");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM poll_options WHERE poll_id = $1")
            .bind(poll_id)
            .execute(&mut *tx)
            .await?;

        let mut rows = sqlx::query_as::<_, PollOptionEntity>(
            r#"
            INSERT INTO poll_options (poll_id, text, order_index)
            SELECT $1, t.text, (t.ord - 1)::int
            FROM UNNEST($2::text[]) WITH ORDINALITY AS t(text, ord)
            RETURNING id, poll_id, text, order_index, created_at
            "#,
        )
        .bind(poll_id)
        .bind(texts)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        rows.sort_by_key(|o| o.order_index);
        Ok(rows)
    }

    /// Returns the number of deleted rows (0 or 1). Dependants cascade.
    pub async fn delete_poll(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_poll");
        let result = sqlx::query("DELETE FROM polls WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn find_stats(&self, id: Uuid) -> Result<Option<PollStatsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_poll_stats");
        let result = sqlx::query_as::<_, PollStatsEntity>(&format!(
            "SELECT {} FROM poll_stats WHERE id = $1",
            STATS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Public polls, newest first.
    pub async fn list_public(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PollStatsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_public_polls");
        let result = sqlx::query_as::<_, PollStatsEntity>(&format!(
            r#"
            SELECT {}
            FROM poll_stats
            WHERE is_public = true
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
            STATS_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_public(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_public_polls");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM polls WHERE is_public = true")
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Polls owned by `owner`, public and private, newest first.
    pub async fn list_by_owner(
        &self,
        owner: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PollStatsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_polls_by_owner");
        let result = sqlx::query_as::<_, PollStatsEntity>(&format!(
            r#"
            SELECT {}
            FROM poll_stats
            WHERE created_by = $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            STATS_COLUMNS
        ))
        .bind(owner)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_by_owner(&self, owner: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_polls_by_owner");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM polls WHERE created_by = $1")
                .bind(owner)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_polls");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM polls")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
