//! Domain models for the polling service.

pub mod comment;
pub mod poll;
pub mod preview;
pub mod share;
pub mod stats;
pub mod user;
pub mod vote;

pub use comment::{Comment, CommentDetails, CommentNode, CommentReport, ReactionType};
pub use poll::{Poll, PollDraft, PollOption, PollSummary};
pub use share::PollShare;
pub use user::{User, UserRole};
pub use vote::{OptionVoteCount, Vote};
