//! Approval request entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `approval_requests` table.
///
/// `resource_id` is a plain-text composite key, not a foreign key. For
/// playbook applies it is `"{playbook_key}:{scope_hash}"`, so an approval
/// granted for one product set can never authorize a different one.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalRequest {
    pub id: DbId,
    pub project_id: DbId,
    pub resource_type: String,
    pub resource_id: String,
    pub status_id: StatusId,
    pub requested_by: DbId,
    pub decided_by: Option<DbId>,
    pub decision_reason: Option<String>,
    /// Set once, by the apply that spent this approval.
    pub consumed: bool,
    pub decided_at: Option<Timestamp>,
    pub consumed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /api/v1/projects/{id}/approvals`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApprovalRequest {
    pub resource_type: String,
    pub resource_id: String,
}

/// Request body for the reject endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectApprovalRequest {
    pub reason: Option<String>,
}

/// Query parameters for `GET /api/v1/projects/{id}/approvals`.
#[derive(Debug, Deserialize)]
pub struct ApprovalListQuery {
    /// Filter by status ID (1 = pending_approval, 2 = approved, 3 = rejected).
    pub status_id: Option<StatusId>,
}
