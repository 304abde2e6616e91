//! AI usage ledger entity model.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `ai_usage_events` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiUsageEvent {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub action: String,
    pub tokens: i64,
    pub run_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
