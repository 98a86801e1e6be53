//! Share code models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::poll::PollResponse;

/// A share code mapping to one poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollShare {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub share_code: String,
    pub created_by: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PollShare {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Builds `{base}/share/{code}`; a trailing slash on `base` is ignored.
pub fn share_url(base_url: &str, code: &str) -> String {
    format!("{}/share/{}", base_url.trim_end_matches('/'), code)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_code: String,
    pub share_url: String,
    /// Payload a client renders as a QR code.
    pub qr_data: String,
    pub poll_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ShareResponse {
    pub fn new(share: PollShare, base_url: &str) -> Self {
        let url = share_url(base_url, &share.share_code);
        Self {
            share_code: share.share_code,
            qr_data: url.clone(),
            share_url: url,
            poll_id: share.poll_id,
            expires_at: share.expires_at,
            created_at: share.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShareResponse {
    pub share_code: String,
    pub poll: PollResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShareValidationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatsResponse {
    pub poll_id: Uuid,
    pub share_count: i64,
    pub last_shared: Option<DateTime<Utc>>,
}

/// Outcome of resolving a code, before it is turned into an HTTP answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRejection {
    NotFound,
    ShareExpired,
    PollExpired,
    PollNotPublic,
}

impl ShareRejection {
    pub fn message(&self) -> &'static str {
        match self {
            ShareRejection::NotFound => "Share code not found",
            ShareRejection::ShareExpired => "Share code has expired",
            ShareRejection::PollExpired => "This poll has expired",
            ShareRejection::PollNotPublic => "This poll is no longer public",
        }
    }
}
