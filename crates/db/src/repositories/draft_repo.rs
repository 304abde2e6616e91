//! Repository for the `drafts` and `draft_items` tables.

use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::draft::{Draft, DraftItem, NewDraft};
use crate::models::status::DraftStatus;

/// Column list for `drafts` queries.
const DRAFT_COLUMNS: &str = "\
    id, project_id, playbook_key, status_id, scope_hash, rules_hash, \
    params, affected_total, draft_generated, generated_by, applied_by, \
    applied_at, created_at, updated_at";

/// Column list for `draft_items` queries.
const ITEM_COLUMNS: &str = "\
    id, draft_id, product_id, field, proposed_value, current_value, \
    applied_at, created_at, updated_at";

/// Provides CRUD operations for drafts and their items.
pub struct DraftRepo;

impl DraftRepo {
    /// Insert a new PARTIAL draft bound to its scope and rules hashes.
    pub async fn create(pool: &PgPool, input: &NewDraft) -> Result<Draft, sqlx::Error> {
        let query = format!(
            "INSERT INTO drafts \
                 (project_id, playbook_key, status_id, scope_hash, rules_hash, params, \
                  affected_total, generated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, Draft>(&query)
            .bind(input.project_id)
            .bind(&input.playbook_key)
            .bind(DraftStatus::Partial.id())
            .bind(&input.scope_hash)
            .bind(&input.rules_hash)
            .bind(&input.params)
            .bind(input.affected_total)
            .bind(input.generated_by)
            .fetch_one(pool)
            .await
    }

    /// Insert one proposed value for a product and bump the parent's
    /// generated counter in the same transaction.
    pub async fn add_item(
        pool: &PgPool,
        draft_id: DbId,
        product_id: DbId,
        field: &str,
        proposed_value: &str,
        current_value: Option<&str>,
    ) -> Result<DraftItem, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO draft_items \
                 (draft_id, product_id, field, proposed_value, current_value) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        );
        let item = sqlx::query_as::<_, DraftItem>(&query)
            .bind(draft_id)
            .bind(product_id)
            .bind(field)
            .bind(proposed_value)
            .bind(current_value)
            .fetch_one(&mut *tx)
            .await?;
        sqlx::query("UPDATE drafts SET draft_generated = draft_generated + 1 WHERE id = $1")
            .bind(draft_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Transition a draft's status.
    pub async fn set_status(
        pool: &PgPool,
        draft_id: DbId,
        status: DraftStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE drafts SET status_id = $2 WHERE id = $1")
            .bind(draft_id)
            .bind(status.id())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record that an apply pass finished cleanly over this draft.
    pub async fn mark_applied(
        pool: &PgPool,
        draft_id: DbId,
        applied_by: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE drafts SET applied_by = $2, applied_at = NOW() WHERE id = $1")
            .bind(draft_id)
            .bind(applied_by)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Expire every non-terminal draft for a playbook whose hashes no
    /// longer match the live catalog. Returns how many were expired.
    pub async fn expire_mismatched(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
        scope_hash: &str,
        rules_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE drafts \
             SET status_id = $5 \
             WHERE project_id = $1 AND playbook_key = $2 \
               AND status_id IN ($6, $7) \
               AND (scope_hash <> $3 OR rules_hash <> $4)",
        )
        .bind(project_id)
        .bind(playbook_key)
        .bind(scope_hash)
        .bind(rules_hash)
        .bind(DraftStatus::Expired.id())
        .bind(DraftStatus::Partial.id())
        .bind(DraftStatus::Ready.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find a draft by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Draft>, sqlx::Error> {
        let query = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = $1");
        sqlx::query_as::<_, Draft>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent non-expired draft for a playbook.
    pub async fn latest_for_playbook(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
    ) -> Result<Option<Draft>, sqlx::Error> {
        let query = format!(
            "SELECT {DRAFT_COLUMNS} FROM drafts \
             WHERE project_id = $1 AND playbook_key = $2 AND status_id <> $3 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Draft>(&query)
            .bind(project_id)
            .bind(playbook_key)
            .bind(DraftStatus::Expired.id())
            .fetch_optional(pool)
            .await
    }

    /// The newest READY draft matching both hashes exactly. This is the
    /// only lookup apply is allowed to use.
    pub async fn find_ready(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
        scope_hash: &str,
        rules_hash: &str,
    ) -> Result<Option<Draft>, sqlx::Error> {
        let query = format!(
            "SELECT {DRAFT_COLUMNS} FROM drafts \
             WHERE project_id = $1 AND playbook_key = $2 \
               AND scope_hash = $3 AND rules_hash = $4 AND status_id = $5 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Draft>(&query)
            .bind(project_id)
            .bind(playbook_key)
            .bind(scope_hash)
            .bind(rules_hash)
            .bind(DraftStatus::Ready.id())
            .fetch_optional(pool)
            .await
    }

    /// All items of a draft, in insertion order.
    pub async fn items_for_draft(
        pool: &PgPool,
        draft_id: DbId,
    ) -> Result<Vec<DraftItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM draft_items \
             WHERE draft_id = $1 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, DraftItem>(&query)
            .bind(draft_id)
            .fetch_all(pool)
            .await
    }

    /// Number of items in a draft.
    pub async fn item_count(pool: &PgPool, draft_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM draft_items WHERE draft_id = $1")
            .bind(draft_id)
            .fetch_one(pool)
            .await
    }

    /// Stamp one item as applied.
    pub async fn mark_item_applied(pool: &PgPool, item_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE draft_items SET applied_at = NOW() WHERE id = $1")
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
