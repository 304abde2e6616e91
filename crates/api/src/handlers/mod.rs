//! Request handlers for the playbook execution API.
//!
//! Each submodule provides async handler functions for one resource
//! group. Handlers resolve the caller's project role first, delegate to
//! `fixline_db` repositories or the engine, and map errors via
//! [`crate::error::AppError`].

pub mod access;
pub mod approval;
pub mod playbook;
pub mod run;
pub mod work_queue;
