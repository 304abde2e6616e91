//! User entity model.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `users` table.
///
/// `plan` is the billing plan key (`free`, `starter`, `pro`, `scale`);
/// quota resolution parses it through `fixline_core::plan::PlanId`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub plan: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
