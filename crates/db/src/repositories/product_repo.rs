//! Repository for the `products` table.
//!
//! Scope queries take a [`Playbook`] and pick the column by matching on
//! it, so no caller-supplied string ever reaches the SQL text.

use sqlx::PgPool;

use fixline_core::playbook::Playbook;
use fixline_core::types::DbId;

use crate::models::product::Product;

/// Column list for `products` queries.
const COLUMNS: &str = "\
    id, project_id, external_ref, name, title, description, seo_description, \
    synced_at, created_at, updated_at";

/// Canonical iteration order for scopes and apply passes. Most recently
/// synced first; never-synced products last; id as the tie-break.
const SCOPE_ORDER: &str = "synced_at DESC NULLS LAST, id ASC";

/// The column a playbook fills.
fn target_column(playbook: Playbook) -> &'static str {
    match playbook {
        Playbook::FillMissingTitles => "title",
        Playbook::FillMissingDescriptions => "description",
        Playbook::FillMissingSeo => "seo_description",
    }
}

/// Provides read/write operations for catalog products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product (used by sync ingestion and test fixtures).
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        external_ref: &str,
        name: &str,
        title: Option<&str>,
        description: Option<&str>,
        seo_description: Option<&str>,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
                 (project_id, external_ref, name, title, description, seo_description, synced_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(project_id)
            .bind(external_ref)
            .bind(name)
            .bind(title)
            .bind(description)
            .bind(seo_description)
            .fetch_one(pool)
            .await
    }

    /// IDs of products whose target field is missing, in canonical scope
    /// order. This ordering is part of the scope hash contract: the same
    /// catalog state must always produce the same id list. A field holding
    /// only whitespace counts as missing.
    pub async fn scope_ids(
        pool: &PgPool,
        project_id: DbId,
        playbook: Playbook,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let column = target_column(playbook);
        let query = format!(
            "SELECT id FROM products \
             WHERE project_id = $1 AND ({column} IS NULL OR btrim({column}) = '') \
             ORDER BY {SCOPE_ORDER}"
        );
        sqlx::query_scalar(&query).bind(project_id).fetch_all(pool).await
    }

    /// Full rows for the current scope, in canonical order.
    pub async fn scope_products(
        pool: &PgPool,
        project_id: DbId,
        playbook: Playbook,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let column = target_column(playbook);
        let query = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE project_id = $1 AND ({column} IS NULL OR btrim({column}) = '') \
             ORDER BY {SCOPE_ORDER}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Write the playbook's target field on one product. Returns `false`
    /// when the product no longer exists.
    pub async fn set_field(
        pool: &PgPool,
        product_id: DbId,
        playbook: Playbook,
        value: &str,
    ) -> Result<bool, sqlx::Error> {
        let column = target_column(playbook);
        let query = format!("UPDATE products SET {column} = $2 WHERE id = $1");
        let result = sqlx::query(&query)
            .bind(product_id)
            .bind(value)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Total product count for a project.
    pub async fn count_for_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }
}
