//! Repository for the `playbook_runs` table.
//!
//! Uses `RunStatus`/`RunType` enums from `models::status` for all status
//! transitions. No magic numbers outside the enums.

use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::run::{PlaybookRun, RunListQuery};
use crate::models::status::{RunStatus, RunType, StatusId};

/// Column list for `playbook_runs` queries.
const COLUMNS: &str = "\
    id, project_id, playbook_key, run_type_id, status_id, created_by, \
    idempotency_key, scope_hash, rules_hash, draft_id, ai_used, \
    result, result_ref, error_code, error_message, \
    started_at, finished_at, created_at, updated_at";

/// Maximum page size for run listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for run listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for playbook runs.
pub struct RunRepo;

impl RunRepo {
    /// Create a QUEUED run, or return the existing run when the caller
    /// re-submits the same (project, idempotency_key) pair.
    pub async fn create_idempotent(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        playbook_key: &str,
        run_type: RunType,
        scope_hash: Option<&str>,
        rules_hash: Option<&str>,
        idempotency_key: &str,
    ) -> Result<PlaybookRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO playbook_runs \
                 (project_id, playbook_key, run_type_id, status_id, created_by, \
                  scope_hash, rules_hash, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_playbook_runs_idempotency DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, PlaybookRun>(&query)
            .bind(project_id)
            .bind(playbook_key)
            .bind(run_type.id())
            .bind(RunStatus::Queued.id())
            .bind(created_by)
            .bind(scope_hash)
            .bind(rules_hash)
            .bind(idempotency_key)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(run) => Ok(run),
            // Conflict: the key was already used, hand back the original.
            None => Self::find_by_idempotency_key(pool, project_id, idempotency_key)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Atomically claim one specific QUEUED run.
    ///
    /// The compare-and-transition on `status_id` is the sole guard against
    /// double execution: a second delivery of the same run id observes a
    /// non-QUEUED row and gets `None`.
    pub async fn claim(pool: &PgPool, run_id: DbId) -> Result<Option<PlaybookRun>, sqlx::Error> {
        let query = format!(
            "UPDATE playbook_runs \
             SET status_id = $2, started_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlaybookRun>(&query)
            .bind(run_id)
            .bind(RunStatus::Running.id())
            .bind(RunStatus::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest QUEUED run, if any.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent dispatcher
    /// workers never pick the same row.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<PlaybookRun>, sqlx::Error> {
        let query = format!(
            "UPDATE playbook_runs \
             SET status_id = $1, started_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM playbook_runs \
                 WHERE status_id = $2 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlaybookRun>(&query)
            .bind(RunStatus::Running.id())
            .bind(RunStatus::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a run SUCCEEDED with its result payload.
    pub async fn mark_succeeded(
        pool: &PgPool,
        run_id: DbId,
        draft_id: Option<DbId>,
        result: Option<&serde_json::Value>,
        result_ref: Option<&str>,
        ai_used: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE playbook_runs \
             SET status_id = $2, draft_id = COALESCE($3, draft_id), result = $4, \
                 result_ref = $5, ai_used = $6, finished_at = NOW() \
             WHERE id = $1",
        )
        .bind(run_id)
        .bind(RunStatus::Succeeded.id())
        .bind(draft_id)
        .bind(result)
        .bind(result_ref)
        .bind(ai_used)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a run FAILED with its error classification.
    pub async fn mark_failed(
        pool: &PgPool,
        run_id: DbId,
        error_code: &str,
        error_message: &str,
        ai_used: bool,
    ) -> Result<(), sqlx::Error> {
        Self::mark_terminal_error(pool, run_id, RunStatus::Failed, error_code, error_message, ai_used)
            .await
    }

    /// Mark a run STALE. Stale runs must not be retried as-is; the caller
    /// needs a fresh preview/draft cycle.
    pub async fn mark_stale(
        pool: &PgPool,
        run_id: DbId,
        error_code: &str,
        error_message: &str,
        ai_used: bool,
    ) -> Result<(), sqlx::Error> {
        Self::mark_terminal_error(pool, run_id, RunStatus::Stale, error_code, error_message, ai_used)
            .await
    }

    async fn mark_terminal_error(
        pool: &PgPool,
        run_id: DbId,
        status: RunStatus,
        error_code: &str,
        error_message: &str,
        ai_used: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE playbook_runs \
             SET status_id = $2, error_code = $3, error_message = $4, \
                 ai_used = $5, finished_at = NOW() \
             WHERE id = $1",
        )
        .bind(run_id)
        .bind(status.id())
        .bind(error_code)
        .bind(error_message)
        .bind(ai_used)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record the draft id produced mid-run (before the terminal update).
    pub async fn set_draft_id(
        pool: &PgPool,
        run_id: DbId,
        draft_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE playbook_runs SET draft_id = $2 WHERE id = $1")
            .bind(run_id)
            .bind(draft_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Find a run by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlaybookRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playbook_runs WHERE id = $1");
        sqlx::query_as::<_, PlaybookRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a run by its caller-chosen idempotency key.
    pub async fn find_by_idempotency_key(
        pool: &PgPool,
        project_id: DbId,
        idempotency_key: &str,
    ) -> Result<Option<PlaybookRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playbook_runs \
             WHERE project_id = $1 AND idempotency_key = $2"
        );
        sqlx::query_as::<_, PlaybookRun>(&query)
            .bind(project_id)
            .bind(idempotency_key)
            .fetch_optional(pool)
            .await
    }

    /// The most recent run for one playbook, regardless of status.
    pub async fn latest_for_playbook(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
    ) -> Result<Option<PlaybookRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playbook_runs \
             WHERE project_id = $1 AND playbook_key = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PlaybookRun>(&query)
            .bind(project_id)
            .bind(playbook_key)
            .fetch_optional(pool)
            .await
    }

    /// Finish time of the most recent successful APPLY run for a playbook.
    pub async fn last_apply_finished_at(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT finished_at FROM playbook_runs \
             WHERE project_id = $1 AND playbook_key = $2 \
               AND run_type_id = $3 AND status_id = $4 \
               AND finished_at IS NOT NULL \
             ORDER BY finished_at DESC \
             LIMIT 1",
        )
        .bind(project_id)
        .bind(playbook_key)
        .bind(RunType::Apply.id())
        .bind(RunStatus::Succeeded.id())
        .fetch_optional(pool)
        .await
    }

    /// List runs for a project with optional playbook/status filters and
    /// pagination.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        params: &RunListQuery,
    ) -> Result<Vec<PlaybookRun>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions = vec!["project_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.playbook.is_some() {
            conditions.push(format!("playbook_key = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM playbook_runs \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, PlaybookRun>(&query).bind(project_id);
        if let Some(playbook) = &params.playbook {
            q = q.bind(playbook);
        }
        if let Some(sid) = params.status_id {
            q = q.bind::<StatusId>(sid);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
