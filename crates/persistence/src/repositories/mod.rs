//! Repository implementations for database operations.

pub mod comment;
pub mod poll;
pub mod share;
pub mod user;
pub mod vote;

pub use comment::CommentRepository;
pub use poll::PollRepository;
pub use share::ShareRepository;
pub use user::UserRepository;
pub use vote::{VoteRepository, VoterContext};
