//! Draft and draft item entity models.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `drafts` table.
///
/// The (scope_hash, rules_hash) pair pins the draft to the exact product
/// set and generation params it was built from.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Draft {
    pub id: DbId,
    pub project_id: DbId,
    pub playbook_key: String,
    pub status_id: StatusId,
    pub scope_hash: String,
    pub rules_hash: String,
    pub params: serde_json::Value,
    /// Scope size at generation time.
    pub affected_total: i64,
    /// Items written so far; equals `affected_total` once the draft is ready.
    pub draft_generated: i64,
    pub generated_by: Option<DbId>,
    pub applied_by: Option<DbId>,
    pub applied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftItem {
    pub id: DbId,
    pub draft_id: DbId,
    pub product_id: DbId,
    pub field: String,
    pub proposed_value: String,
    pub current_value: Option<String>,
    pub applied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields for inserting a new draft. Rows start as `Partial`; the
/// generator promotes them to `Ready` once every item is written.
#[derive(Debug, Clone)]
pub struct NewDraft {
    pub project_id: DbId,
    pub playbook_key: String,
    pub scope_hash: String,
    pub rules_hash: String,
    pub params: serde_json::Value,
    pub affected_total: i64,
    pub generated_by: Option<DbId>,
}
