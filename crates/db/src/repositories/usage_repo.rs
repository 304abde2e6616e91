//! Repository for the `ai_usage_events` ledger.

use sqlx::PgPool;

use fixline_core::plan::UsageToday;
use fixline_core::types::DbId;

use crate::models::usage::AiUsageEvent;

/// Column list for `ai_usage_events` queries.
const COLUMNS: &str =
    "id, user_id, project_id, action, tokens, run_id, product_id, created_at, updated_at";

/// Provides append and aggregate operations for the AI usage ledger.
pub struct UsageRepo;

impl UsageRepo {
    /// Append one usage event.
    pub async fn record(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        action: &str,
        tokens: i64,
        run_id: Option<DbId>,
        product_id: Option<DbId>,
    ) -> Result<AiUsageEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_usage_events (user_id, project_id, action, tokens, run_id, product_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AiUsageEvent>(&query)
            .bind(user_id)
            .bind(project_id)
            .bind(action)
            .bind(tokens)
            .bind(run_id)
            .bind(product_id)
            .fetch_one(pool)
            .await
    }

    /// Today's usage for one user (UTC day boundary): action count for the
    /// named action, token total across all actions.
    pub async fn daily_usage(
        pool: &PgPool,
        user_id: DbId,
        action: &str,
    ) -> Result<UsageToday, sqlx::Error> {
        let (actions, tokens): (i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*) FILTER (WHERE action = $2), \
                 COALESCE(SUM(tokens), 0)::BIGINT \
             FROM ai_usage_events \
             WHERE user_id = $1 AND created_at >= date_trunc('day', NOW())",
        )
        .bind(user_id)
        .bind(action)
        .fetch_one(pool)
        .await?;
        Ok(UsageToday { actions, tokens })
    }

    /// All usage rows attributed to one run, oldest first.
    pub async fn list_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<AiUsageEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ai_usage_events \
             WHERE run_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AiUsageEvent>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }
}
