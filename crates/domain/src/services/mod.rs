//! Domain services for the polling service.
//!
//! Pure business rules that operate on domain models; no I/O.

pub mod authorization;
pub mod ballot;
pub mod comment_tree;
pub mod preview;
pub mod results;

pub use authorization::{authorize, can, AccessDenied, Action, Actor};
pub use ballot::{check_ballot, BallotRejection};
pub use comment_tree::{build_comment_tree, count_nodes};
pub use preview::build_poll_preview;
pub use results::{percentage, tally};
