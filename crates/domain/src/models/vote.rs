//! Vote and results models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A single recorded choice. Multi-choice ballots produce one row per option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub option_id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub ip_address: Option<String>,
    #[serde(skip_serializing)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Vote count for an option as aggregated by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionVoteCount {
    pub option_id: Uuid,
    pub vote_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    #[validate(length(min = 1, message = "At least one option must be selected"))]
    pub option_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub poll_id: Uuid,
    pub option_ids: Vec<Uuid>,
    pub voted_at: DateTime<Utc>,
}

/// Per-option line of a results payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: Uuid,
    pub text: String,
    pub order_index: i32,
    pub vote_count: i64,
    /// Integer percentage of `total_votes`, rounded half up.
    pub percentage: i64,
}

/// Chart-ready series in option order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: Uuid,
    pub total_votes: i64,
    pub options: Vec<OptionResult>,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVotesResponse {
    pub poll_id: Uuid,
    pub has_voted: bool,
    pub option_ids: Vec<Uuid>,
}
