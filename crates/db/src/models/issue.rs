//! Issue entity model.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `issues` table, as written by the catalog crawler.
///
/// `category` and `severity` are free-form TEXT; classification into
/// action categories happens at read time in the work queue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub project_id: DbId,
    pub product_id: Option<DbId>,
    pub category: String,
    pub severity: String,
    pub summary: Option<String>,
    pub detected_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
