//! Repository for the `approval_requests` table.
//!
//! The partial unique index `uq_approval_requests_active` enforces at most
//! one live (unconsumed, pending-or-approved) request per project resource;
//! a duplicate insert surfaces as a unique violation for the API to map.

use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::approval::{ApprovalRequest, CreateApprovalRequest};
use crate::models::status::{ApprovalStatus, StatusId};

/// Column list for `approval_requests` queries.
const COLUMNS: &str = "\
    id, project_id, resource_type, resource_id, status_id, requested_by, \
    decided_by, decision_reason, consumed, decided_at, consumed_at, \
    created_at, updated_at";

/// Provides operations for approval requests.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Open a PENDING_APPROVAL request for a resource.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        requested_by: DbId,
        input: &CreateApprovalRequest,
    ) -> Result<ApprovalRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_requests \
                 (project_id, resource_type, resource_id, status_id, requested_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRequest>(&query)
            .bind(project_id)
            .bind(&input.resource_type)
            .bind(&input.resource_id)
            .bind(ApprovalStatus::PendingApproval.id())
            .bind(requested_by)
            .fetch_one(pool)
            .await
    }

    /// Approve a pending request. Returns `None` when the request is not
    /// pending anymore (already decided or consumed).
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
    ) -> Result<Option<ApprovalRequest>, sqlx::Error> {
        Self::decide(pool, id, decided_by, ApprovalStatus::Approved, None).await
    }

    /// Reject a pending request with an optional reason.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
        reason: Option<&str>,
    ) -> Result<Option<ApprovalRequest>, sqlx::Error> {
        Self::decide(pool, id, decided_by, ApprovalStatus::Rejected, reason).await
    }

    async fn decide(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
        status: ApprovalStatus,
        reason: Option<&str>,
    ) -> Result<Option<ApprovalRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE approval_requests \
             SET status_id = $2, decided_by = $3, decision_reason = $4, \
                 decided_at = NOW() \
             WHERE id = $1 AND status_id = $5 AND NOT consumed \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRequest>(&query)
            .bind(id)
            .bind(status.id())
            .bind(decided_by)
            .bind(reason)
            .bind(ApprovalStatus::PendingApproval.id())
            .fetch_optional(pool)
            .await
    }

    /// The valid (APPROVED, unconsumed) request for a resource, if any.
    pub async fn find_valid(
        pool: &PgPool,
        project_id: DbId,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Option<ApprovalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_requests \
             WHERE project_id = $1 AND resource_type = $2 AND resource_id = $3 \
               AND status_id = $4 AND NOT consumed"
        );
        sqlx::query_as::<_, ApprovalRequest>(&query)
            .bind(project_id)
            .bind(resource_type)
            .bind(resource_id)
            .bind(ApprovalStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }

    /// The live (PENDING_APPROVAL or APPROVED, unconsumed) request for a
    /// resource.
    pub async fn find_active(
        pool: &PgPool,
        project_id: DbId,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Option<ApprovalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_requests \
             WHERE project_id = $1 AND resource_type = $2 AND resource_id = $3 \
               AND status_id IN ($4, $5) AND NOT consumed"
        );
        sqlx::query_as::<_, ApprovalRequest>(&query)
            .bind(project_id)
            .bind(resource_type)
            .bind(resource_id)
            .bind(ApprovalStatus::PendingApproval.id())
            .bind(ApprovalStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }

    /// Spend an approval. Called exactly once, immediately after the gated
    /// action completed. Returns `false` if the row was not a spendable
    /// approval (not approved, or already consumed).
    pub async fn mark_consumed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE approval_requests \
             SET consumed = TRUE, consumed_at = NOW() \
             WHERE id = $1 AND status_id = $2 AND NOT consumed",
        )
        .bind(id)
        .bind(ApprovalStatus::Approved.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ApprovalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_requests WHERE id = $1");
        sqlx::query_as::<_, ApprovalRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's requests, newest first, optionally by status.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        status_id: Option<StatusId>,
    ) -> Result<Vec<ApprovalRequest>, sqlx::Error> {
        match status_id {
            Some(sid) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM approval_requests \
                     WHERE project_id = $1 AND status_id = $2 \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, ApprovalRequest>(&query)
                    .bind(project_id)
                    .bind(sid)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM approval_requests \
                     WHERE project_id = $1 \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, ApprovalRequest>(&query)
                    .bind(project_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }
}
