//! Domain layer for the polling service.
//!
//! This crate contains:
//! - Domain models (User, Poll, Vote, Comment, PollShare) and request/response DTOs
//! - Pure business services: capability checks, ballot checks, result tallying,
//!   comment threading and social preview metadata

pub mod models;
pub mod services;
