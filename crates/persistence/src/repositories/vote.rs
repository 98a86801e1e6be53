//! Vote repository for database operations.

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::entities::{OptionVoteCountEntity, VoteEntity};
use crate::metrics::QueryTimer;

/// Client details recorded with every vote row.
#[derive(Debug, Clone, Default)]
pub struct VoterContext<'a> {
    pub user_id: Option<Uuid>,
    pub ip_address: &'a str,
    pub user_agent: Option<&'a str>,
}

/// Repository for votes and vote aggregation.
#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Asks the `check_vote_rate_limit` database function whether another vote may be cast.
    pub async fn check_rate_limit(
        &self,
        poll_id: Uuid,
        ip_address: &str,
        user_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_vote_rate_limit");
        let result = sqlx::query_scalar::<_, Option<bool>>(
            "SELECT check_vote_rate_limit($1, $2, $3)",
        )
        .bind(poll_id)
        .bind(ip_address)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(|allowed| allowed.unwrap_or(false))
    }

    /// Writes one row per option in a single transaction.
    ///
    /// A unique violation (`23505`) means the voter already voted and is
    /// returned untouched for the caller to classify.
    pub async fn insert_ballot(
        &self,
        poll_id: Uuid,
        option_ids: &[Uuid],
        allow_multiple: bool,
        voter: &VoterContext<'_>,
    ) -> Result<Vec<VoteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_ballot");
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(option_ids.len());

        for option_id in option_ids {
            let row = sqlx::query_as::<_, VoteEntity>(
                r#"
                INSERT INTO votes (poll_id, option_id, user_id, ip_address, user_agent, allow_multiple)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, poll_id, option_id, user_id, ip_address, user_agent, allow_multiple, created_at
                "#,
            )
            .bind(poll_id)
            .bind(option_id)
            .bind(voter.user_id)
            .bind(voter.ip_address)
            .bind(voter.user_agent)
            .bind(allow_multiple)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        timer.record();
        debug!(poll_id = %poll_id, rows = rows.len(), "Ballot stored");
        Ok(rows)
    }

    /// Vote counts per option. Options without votes are absent.
    pub async fn count_by_option(
        &self,
        poll_id: Uuid,
    ) -> Result<Vec<OptionVoteCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("count_votes_by_option");
        let result = sqlx::query_as::<_, OptionVoteCountEntity>(
            r#"
            SELECT option_id, COUNT(*) AS vote_count
            FROM votes
            WHERE poll_id = $1
            GROUP BY option_id
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Options the user has voted for on this poll.
    pub async fn user_option_ids(
        &self,
        poll_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_votes");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT option_id
            FROM votes
            WHERE poll_id = $1 AND user_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn has_user_voted(&self, poll_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("has_user_voted");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM votes WHERE poll_id = $1 AND user_id = $2)",
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_votes");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
