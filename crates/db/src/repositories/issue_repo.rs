//! Repository for the `issues` table.

use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::issue::Issue;

/// Column list for `issues` queries.
const COLUMNS: &str = "\
    id, project_id, product_id, category, severity, summary, detected_at, \
    resolved_at, created_at, updated_at";

/// Provides read/write operations for crawler-reported issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Record a new open issue.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        product_id: Option<DbId>,
        category: &str,
        severity: &str,
        summary: Option<&str>,
    ) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues (project_id, product_id, category, severity, summary) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .bind(product_id)
            .bind(category)
            .bind(severity)
            .bind(summary)
            .fetch_one(pool)
            .await
    }

    /// All open issues for a project in a stable order.
    pub async fn open_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues \
             WHERE project_id = $1 AND resolved_at IS NULL \
             ORDER BY updated_at DESC, id ASC"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Close an issue. Returns `false` when it was already resolved.
    pub async fn resolve(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE issues SET resolved_at = NOW() WHERE id = $1 AND resolved_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
