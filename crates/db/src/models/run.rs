//! Playbook run entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `playbook_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaybookRun {
    pub id: DbId,
    pub project_id: DbId,
    pub playbook_key: String,
    pub run_type_id: StatusId,
    pub status_id: StatusId,
    pub created_by: DbId,
    pub idempotency_key: String,
    pub scope_hash: Option<String>,
    pub rules_hash: Option<String>,
    pub draft_id: Option<DbId>,
    pub ai_used: bool,
    /// Result payload; an apply report for APPLY runs.
    pub result: Option<serde_json::Value>,
    /// Human-readable pointer to what the run produced, e.g. a draft id
    /// or the applied `"{playbook_key}:{scope_hash}"` pair.
    pub result_ref: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /api/v1/projects/{id}/playbooks/{playbook}/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerRun {
    /// One of `preview_generate`, `draft_generate`, `apply`.
    pub run_type: String,
    pub scope_hash: Option<String>,
    pub rules_hash: Option<String>,
    /// Caller-chosen key; re-posting with the same key returns the
    /// original run instead of creating a duplicate.
    pub idempotency_key: String,
}

/// Query parameters for `GET /api/v1/projects/{id}/runs`.
#[derive(Debug, Default, Deserialize)]
pub struct RunListQuery {
    /// Filter by playbook key.
    pub playbook: Option<String>,
    /// Filter by status ID (e.g. 1 = queued, 4 = failed).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
