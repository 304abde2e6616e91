//! Pure domain logic for the playbook automation engine.
//!
//! Nothing in this crate performs I/O. Database access lives in
//! `fixline-db`, run execution in `fixline-engine`, HTTP in `fixline-api`.

pub mod apply;
pub mod approval;
pub mod error;
pub mod issue;
pub mod plan;
pub mod playbook;
pub mod queue;
pub mod roles;
pub mod run;
pub mod scope;
pub mod types;
