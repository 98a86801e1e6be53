//! Comment repository: comments, reports and reactions.

use domain::models::comment::CommentStats;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::entities::{
    CommentDetailsEntity, CommentEntity, CommentReportEntity, ReactionCountsEntity,
    ReportedCommentEntity,
};
use crate::metrics::QueryTimer;

const COMMENT_COLUMNS: &str =
    "id, poll_id, user_id, parent_id, content, is_visible, report_count, created_at, updated_at";

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flat list for a poll ordered oldest first, with author and reaction data.
    ///
    /// `viewer` fills `user_reaction`; hidden comments are included only when
    /// `include_hidden` is set.
    pub async fn list_for_poll(
        &self,
        poll_id: Uuid,
        viewer: Option<Uuid>,
        include_hidden: bool,
    ) -> Result<Vec<CommentDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_poll_comments");
        let result = sqlx::query_as::<_, CommentDetailsEntity>(
            r#"
            SELECT c.id, c.poll_id, c.user_id, c.parent_id, c.content, c.is_visible,
                   c.report_count, c.created_at, c.updated_at,
                   u.name AS author_name,
                   COUNT(r.id) FILTER (WHERE r.reaction_type = 'like') AS like_count,
                   COUNT(r.id) FILTER (WHERE r.reaction_type = 'dislike') AS dislike_count,
                   MAX(r.reaction_type) FILTER (WHERE r.user_id = $2) AS user_reaction
            FROM comments c
            JOIN users u ON u.id = c.user_id
            LEFT JOIN comment_reactions r ON r.comment_id = c.id
            WHERE c.poll_id = $1 AND ($3 OR c.is_visible)
            GROUP BY c.id, u.name
            ORDER BY c.created_at ASC, c.id
            "#,
        )
        .bind(poll_id)
        .bind(viewer)
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_comment_by_id");
        let result = sqlx::query_as::<_, CommentEntity>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(
        &self,
        poll_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> Result<CommentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_comment");
        let result = sqlx::query_as::<_, CommentEntity>(&format!(
            r#"
            INSERT INTO comments (poll_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(poll_id)
        .bind(user_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_comment");
        let result = sqlx::query_as::<_, CommentEntity>(&format!(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Hard delete. Replies, reports and reactions cascade.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_comment");
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn set_visibility(
        &self,
        id: Uuid,
        is_visible: bool,
    ) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_comment_visibility");
        let result = sqlx::query_as::<_, CommentEntity>(&format!(
            r#"
            UPDATE comments
            SET is_visible = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(is_visible)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn has_reported(&self, comment_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("has_reported_comment");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM comment_reports WHERE comment_id = $1 AND user_id = $2)",
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Stores the report and bumps `report_count` atomically.
    pub async fn report(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        reason: &str,
    ) -> Result<CommentReportEntity, sqlx::Error> {
        let timer = QueryTimer::new("report_comment");
        let mut tx = self.pool.begin().await?;

        let report = sqlx::query_as::<_, CommentReportEntity>(
            r#"
            INSERT INTO comment_reports (comment_id, user_id, reason)
            VALUES ($1, $2, $3)
            RETURNING id, comment_id, user_id, reason, created_at
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE comments SET report_count = report_count + 1 WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(report)
    }

    /// Applies a reaction with toggle semantics and returns the caller's
    /// resulting reaction (`None` when it was removed).
    pub async fn toggle_reaction(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        reaction_type: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_comment_reaction");
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT reaction_type
            FROM comment_reactions
            WHERE comment_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = if existing.as_deref() == Some(reaction_type) {
            sqlx::query("DELETE FROM comment_reactions WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            None
        } else {
            sqlx::query(
                r#"
                INSERT INTO comment_reactions (comment_id, user_id, reaction_type)
                VALUES ($1, $2, $3)
                ON CONFLICT (comment_id, user_id)
                DO UPDATE SET reaction_type = EXCLUDED.reaction_type, created_at = NOW()
                "#,
            )
            .bind(comment_id)
            .bind(user_id)
            .bind(reaction_type)
            .execute(&mut *tx)
            .await?;
            Some(reaction_type.to_string())
        };

        tx.commit().await?;
        timer.record();
        debug!(comment_id = %comment_id, reaction = ?outcome, "Reaction toggled");
        Ok(outcome)
    }

    pub async fn reaction_counts(&self, comment_id: Uuid) -> Result<ReactionCountsEntity, sqlx::Error> {
        let timer = QueryTimer::new("comment_reaction_counts");
        let result = sqlx::query_as::<_, ReactionCountsEntity>(
            r#"
            SELECT COUNT(*) FILTER (WHERE reaction_type = 'like') AS like_count,
                   COUNT(*) FILTER (WHERE reaction_type = 'dislike') AS dislike_count
            FROM comment_reactions
            WHERE comment_id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Moderation queue, most reported first.
    pub async fn list_reported(&self, limit: i64) -> Result<Vec<ReportedCommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_reported_comments");
        let result = sqlx::query_as::<_, ReportedCommentEntity>(
            r#"
            SELECT c.id, c.poll_id, p.title AS poll_title, c.content, c.is_visible,
                   c.report_count, c.user_id, u.name AS author_name,
                   (SELECT r.reason FROM comment_reports r
                     WHERE r.comment_id = c.id
                     ORDER BY r.created_at DESC
                     LIMIT 1) AS latest_reason,
                   c.created_at
            FROM comments c
            JOIN polls p ON p.id = c.poll_id
            JOIN users u ON u.id = c.user_id
            WHERE c.report_count > 0
            ORDER BY c.report_count DESC, c.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn stats(&self) -> Result<CommentStats, sqlx::Error> {
        let timer = QueryTimer::new("comment_stats");
        let result = sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_visible),
                COUNT(*) FILTER (WHERE is_visible AND created_at >= date_trunc('day', NOW())),
                COUNT(*) FILTER (WHERE is_visible AND created_at >= NOW() - INTERVAL '7 days'),
                COUNT(*) FILTER (WHERE NOT is_visible),
                COUNT(*) FILTER (WHERE report_count > 0)
            FROM comments
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(|(total, today, this_week, hidden, reported)| CommentStats {
            total,
            today,
            this_week,
            hidden,
            reported,
        })
    }
}
