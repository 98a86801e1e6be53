//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod health;
pub mod polls;
pub mod preview;
pub mod shares;
pub mod stats;
pub mod votes;
