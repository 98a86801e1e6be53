//! Shared utilities for the polling backend.
//!
//! - Share code generation and normalization
//! - JWT access/refresh tokens
//! - Password hashing with Argon2id
//! - Offset pagination
//! - Validation helpers used by request DTOs

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
