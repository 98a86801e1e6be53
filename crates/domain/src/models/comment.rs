//! Comment, report and reaction models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::user::UserSummary;

/// A comment on a poll. `parent_id == None` marks a root comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Dislike => "dislike",
        }
    }
}

impl FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(ReactionType::Like),
            "dislike" => Ok(ReactionType::Dislike),
            _ => Err(format!("Invalid reaction type: {}", s)),
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flat comment row enriched with author and reaction data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetails {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_visible: bool,
    pub report_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: UserSummary,
    pub like_count: i64,
    pub dislike_count: i64,
    pub user_reaction: Option<ReactionType>,
}

/// A comment with its replies nested beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentDetails,
    pub reply_count: usize,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadResponse {
    pub poll_id: Uuid,
    pub total: usize,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(custom(function = "validate_comment_content"))]
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[validate(custom(function = "validate_comment_content"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibilityRequest {
    pub is_visible: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportCommentRequest {
    #[validate(custom(function = "validate_report_reason"))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactToCommentRequest {
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub comment_id: Uuid,
    /// `None` when the request toggled an existing reaction off.
    pub reaction_type: Option<ReactionType>,
    pub like_count: i64,
    pub dislike_count: i64,
}

/// A stored report against a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReport {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
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

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            poll_id: c.poll_id,
            user_id: c.user_id,
            parent_id: c.parent_id,
            content: c.content,
            is_visible: c.is_visible,
            report_count: c.report_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Comment in the moderation queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedComment {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub poll_title: String,
    pub content: String,
    pub is_visible: bool,
    pub report_count: i32,
    pub author: UserSummary,
    pub latest_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Visible-comment counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentStats {
    pub total: i64,
    pub today: i64,
    pub this_week: i64,
    pub hidden: i64,
    pub reported: i64,
}

pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_REPORT_REASON_LENGTH: usize = 500;

fn validate_comment_content(content: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_trimmed_length(
        content,
        MAX_COMMENT_LENGTH,
        "Comment must be between 1 and 1000 characters",
    )
}

fn validate_report_reason(reason: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_trimmed_length(
        reason,
        MAX_REPORT_REASON_LENGTH,
        "Reason must be between 1 and 500 characters",
    )
}
