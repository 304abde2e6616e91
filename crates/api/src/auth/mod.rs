//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Tokens carry identity only. Authorization is per-project: handlers
//! resolve the caller's role through `project_members` on every request,
//! so a role change takes effect without reissuing tokens.

pub mod jwt;
