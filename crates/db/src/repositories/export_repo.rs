//! Repository for the `catalog_exports` table.

use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::export::CatalogExport;
use crate::models::status::ExportStatus;

/// Column list for `catalog_exports` queries.
const COLUMNS: &str = "\
    id, project_id, status_id, share_token, product_count, last_exported_at, \
    created_at, updated_at";

/// Provides operations for the per-project export row.
pub struct ExportRepo;

impl ExportRepo {
    /// The export row for a project, if one exists.
    pub async fn find_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<CatalogExport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM catalog_exports WHERE project_id = $1");
        sqlx::query_as::<_, CatalogExport>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a completed export, creating or replacing the project row.
    pub async fn record_export(
        pool: &PgPool,
        project_id: DbId,
        share_token: &str,
        product_count: i64,
    ) -> Result<CatalogExport, sqlx::Error> {
        let query = format!(
            "INSERT INTO catalog_exports \
                 (project_id, status_id, share_token, product_count, last_exported_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT ON CONSTRAINT uq_catalog_exports_project DO UPDATE \
             SET status_id = EXCLUDED.status_id, \
                 share_token = EXCLUDED.share_token, \
                 product_count = EXCLUDED.product_count, \
                 last_exported_at = EXCLUDED.last_exported_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CatalogExport>(&query)
            .bind(project_id)
            .bind(ExportStatus::Exported.id())
            .bind(share_token)
            .bind(product_count)
            .fetch_one(pool)
            .await
    }

    /// Flag the export as stale after catalog content changed. No-op when
    /// the project has no export row.
    pub async fn mark_stale(pool: &PgPool, project_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE catalog_exports SET status_id = $2 \
             WHERE project_id = $1 AND status_id = $3",
        )
        .bind(project_id)
        .bind(ExportStatus::Stale.id())
        .bind(ExportStatus::Exported.id())
        .execute(pool)
        .await?;
        Ok(())
    }
}
