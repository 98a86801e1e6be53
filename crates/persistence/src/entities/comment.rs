//! Comment entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::comment::{CommentDetails, ReportedComment};
use domain::models::user::UserSummary;
use domain::models::ReactionType;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the comments table.
#[derive(Debug, Clone, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_visible: bool,
    pub report_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentEntity> for domain::models::Comment {
    fn from(e: CommentEntity) -> Self {
        Self {
            id: e.id,
            poll_id: e.poll_id,
            user_id: e.user_id,
            parent_id: e.parent_id,
            content: e.content,
            is_visible: e.is_visible,
            report_count: e.report_count,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Comment joined with author name and reaction counters.
#[derive(Debug, Clone, FromRow)]
pub struct CommentDetailsEntity {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_visible: bool,
    pub report_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    pub like_count: i64,
    pub dislike_count: i64,
    pub user_reaction: Option<String>,
}

impl From<CommentDetailsEntity> for CommentDetails {
    fn from(e: CommentDetailsEntity) -> Self {
        Self {
            id: e.id,
            poll_id: e.poll_id,
            parent_id: e.parent_id,
            content: e.content,
            is_visible: e.is_visible,
            report_count: e.report_count,
            created_at: e.created_at,
            updated_at: e.updated_at,
            author: UserSummary {
                id: e.user_id,
                name: e.author_name,
            },
            like_count: e.like_count,
            dislike_count: e.dislike_count,
            user_reaction: e
                .user_reaction
                .as_deref()
                .and_then(|r| ReactionType::from_str(r).ok()),
        }
    }
}

/// Database row mapping for the comment_reports table.
#[derive(Debug, Clone, FromRow)]
pub struct CommentReportEntity {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentReportEntity> for domain::models::CommentReport {
    fn from(e: CommentReportEntity) -> Self {
        Self {
            id: e.id,
            comment_id: e.comment_id,
            user_id: e.user_id,
            reason: e.reason,
            created_at: e.created_at,
        }
    }
}

/// Moderation queue row.
#[derive(Debug, Clone, FromRow)]
pub struct ReportedCommentEntity {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub poll_title: String,
    pub content: String,
    pub is_visible: bool,
    pub report_count: i32,
    pub user_id: Uuid,
    pub author_name: String,
    pub latest_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportedCommentEntity> for ReportedComment {
    fn from(e: ReportedCommentEntity) -> Self {
        Self {
            id: e.id,
            poll_id: e.poll_id,
            poll_title: e.poll_title,
            content: e.content,
            is_visible: e.is_visible,
            report_count: e.report_count,
            author: UserSummary {
                id: e.user_id,
                name: e.author_name,
            },
            latest_reason: e.latest_reason,
            created_at: e.created_at,
        }
    }
}

/// Reaction counters for one comment.
#[derive(Debug, Clone, FromRow)]
pub struct ReactionCountsEntity {
    pub like_count: i64,
    pub dislike_count: i64,
}
