//! Per-project playbook settings entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `playbook_settings` table.
///
/// `params` feeds the canonical rules hash. A project without a row for a
/// playbook runs it with default params (empty object).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaybookSetting {
    pub id: DbId,
    pub project_id: DbId,
    pub playbook_key: String,
    pub params: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `PUT /api/v1/projects/{id}/playbooks/{playbook}/settings`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPlaybookSetting {
    pub params: serde_json::Value,
}
