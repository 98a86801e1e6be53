//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod comment;
pub mod poll;
pub mod share;
pub mod user;
pub mod vote;

pub use comment::{
    CommentDetailsEntity, CommentEntity, CommentReportEntity, ReactionCountsEntity,
    ReportedCommentEntity,
};
pub use poll::{PollEntity, PollOptionEntity, PollStatsEntity};
pub use share::{PollShareEntity, ShareStatsEntity};
pub use user::{RoleCountEntity, UserEntity};
pub use vote::{OptionVoteCountEntity, VoteEntity};
