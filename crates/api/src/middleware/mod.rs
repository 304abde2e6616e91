//! Authentication middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//!
//! There is no role extractor: roles are per-project, so handlers resolve
//! them through [`crate::handlers::access::project_access`] instead.

pub mod auth;
