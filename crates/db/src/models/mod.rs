//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the HTTP surface where the entity has one

pub mod approval;
pub mod draft;
pub mod event;
pub mod export;
pub mod issue;
pub mod playbook_setting;
pub mod product;
pub mod project;
pub mod run;
pub mod status;
pub mod usage;
pub mod user;
