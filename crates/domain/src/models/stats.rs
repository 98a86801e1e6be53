//! Aggregate counters for the public landing page and the admin area.

use serde::{Deserialize, Serialize};

use super::comment::CommentStats;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    pub total_polls: i64,
    pub total_votes: i64,
    pub total_users: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total: i64,
    pub users: i64,
    pub moderators: i64,
    pub admins: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollCounts {
    pub total: i64,
    pub public: i64,
    pub private: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: UserCounts,
    pub polls: PollCounts,
    pub total_votes: i64,
    pub comments: CommentStats,
}
