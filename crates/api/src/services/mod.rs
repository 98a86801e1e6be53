//! Application services that combine repositories with domain rules.

pub mod admin_bootstrap;
pub mod auth;
pub mod shares;
pub mod voting;

pub use auth::AuthService;
pub use shares::ShareService;
pub use voting::VoteService;
