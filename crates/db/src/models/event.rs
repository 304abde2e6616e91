//! Event and event-type entity models.

use serde::Serialize;
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `event_types` lookup table.
///
/// `is_critical` marks the names the persistence task surfaces at warn
/// level (operator-facing failures such as `run.failed`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventType {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub is_critical: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `events` table.
///
/// `occurred_at` is when the event happened in the publishing process;
/// `created_at` is when the persistence task wrote the row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type_id: DbId,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
