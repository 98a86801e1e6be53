//! Poll and poll option domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::PageMeta;
use shared::validation::{normalize_options, trim_to_option, validate_normalized_options};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// A question owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
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

impl Poll {
    /// A poll with `expires_at` strictly before `now` no longer accepts votes.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// One choice within a poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub text: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Poll row from the `poll_stats` view, used by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
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

fn default_true() -> bool {
    true
}

/// Request payload for creating a poll. Also used for full replacement on edit.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    #[validate(custom(function = "shared::validation::validate_poll_title"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub options: Vec<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,

    #[serde(default)]
    pub allow_multiple_votes: bool,

    #[serde(default = "default_true")]
    pub allow_anonymous_votes: bool,

    pub expires_at: Option<DateTime<Utc>>,
}

pub type UpdatePollRequest = CreatePollRequest;

/// Normalized poll content ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PollDraft {
    pub title: String,
    pub description: Option<String>,
    pub options: Vec<String>,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub allow_anonymous_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreatePollRequest {
    /// Validates the payload and returns trimmed content.
    ///
    /// Options are trimmed, blanks dropped and the list truncated to
    /// `max_options` before the two-option minimum is checked.
    pub fn into_draft(self, max_options: usize) -> Result<PollDraft, ValidationErrors> {
        self.draft(max_options, None)
    }

    /// Like `into_draft`, but an expiry equal to `current_expiry` is kept
    /// even when it already lies in the past.
    pub fn into_update_draft(
        self,
        max_options: usize,
        current_expiry: Option<DateTime<Utc>>,
    ) -> Result<PollDraft, ValidationErrors> {
        self.draft(max_options, current_expiry)
    }

    fn draft(
        self,
        max_options: usize,
        current_expiry: Option<DateTime<Utc>>,
    ) -> Result<PollDraft, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        let options = normalize_options(&self.options, max_options);
        if let Err(e) = validate_normalized_options(&options) {
            errors.add("options", e);
        }

        if let Some(at) = self.expires_at {
            if at <= Utc::now() && current_expiry != Some(at) {
                let mut e = ValidationError::new("expires_at_past");
                e.message = Some("Expiration must be in the future".into());
                errors.add("expiresAt", e);
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(PollDraft {
            title: self.title.trim().to_string(),
            description: trim_to_option(self.description.as_deref()),
            options,
            is_public: self.is_public,
            allow_multiple_votes: self.allow_multiple_votes,
            allow_anonymous_votes: self.allow_anonymous_votes,
            expires_at: self.expires_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResponse {
    pub id: Uuid,
    pub text: String,
    pub order_index: i32,
}

impl From<PollOption> for PollOptionResponse {
    fn from(o: PollOption) -> Self {
        Self {
            id: o.id,
            text: o.text,
            order_index: o.order_index,
        }
    }
}

/// Poll with its ordered options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub allow_anonymous_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub options: Vec<PollOptionResponse>,
}

impl PollResponse {
    /// Options are emitted in `order_index` order regardless of input order.
    pub fn new(poll: Poll, mut options: Vec<PollOption>) -> Self {
        options.sort_by_key(|o| o.order_index);
        Self {
            is_expired: poll.is_expired(),
            id: poll.id,
            title: poll.title,
            description: poll.description,
            is_public: poll.is_public,
            allow_multiple_votes: poll.allow_multiple_votes,
            allow_anonymous_votes: poll.allow_anonymous_votes,
            expires_at: poll.expires_at,
            created_by: poll.created_by,
            created_at: poll.created_at,
            updated_at: poll.updated_at,
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollListResponse {
    pub data: Vec<PollSummary>,
    pub pagination: PageMeta,
}
