//! Catalog product entity model.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `products` table.
///
/// `title`, `description`, and `seo_description` are the playbook-fillable
/// fields; NULL and empty string both count as missing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub project_id: DbId,
    pub external_ref: String,
    /// Internal merchant-facing name; always present, never playbook-written.
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub seo_description: Option<String>,
    pub synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Read the named fillable field.
    pub fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "title" => self.title.as_deref(),
            "description" => self.description.as_deref(),
            "seo_description" => self.seo_description.as_deref(),
            _ => None,
        }
    }

    /// Whether the named field still counts as missing.
    pub fn field_missing(&self, field: &str) -> bool {
        self.field_value(field).map_or(true, str::is_empty)
    }
}
