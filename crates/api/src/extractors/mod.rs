//! Custom Axum extractors.

pub mod client_info;
pub mod user_auth;

pub use client_info::ClientInfo;
pub use user_auth::{OptionalUserAuth, UserAuth};
