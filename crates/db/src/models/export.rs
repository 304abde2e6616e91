//! Catalog export entity model.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `catalog_exports` table. One per project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogExport {
    pub id: DbId,
    pub project_id: DbId,
    pub status_id: StatusId,
    pub share_token: Option<String>,
    pub product_count: i64,
    pub last_exported_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
