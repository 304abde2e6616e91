//! Repository for the `events` and `event_types` tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::event::{Event, EventType};

/// Column list for `event_types` queries.
const EVENT_TYPE_COLUMNS: &str = "id, name, category, description, is_critical, \
     created_at, updated_at";

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "id, event_type_id, source_entity_type, source_entity_id, \
     actor_user_id, payload, occurred_at, created_at, updated_at";

/// Append and read the durable event log.
pub struct EventRepo;

impl EventRepo {
    /// Resolve a dotted name (e.g. `"draft.ready"`) against the seeded
    /// event type catalog.
    pub async fn get_event_type_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE name = $1");
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new event row, returning the generated ID.
    ///
    /// `occurred_at` comes from the bus envelope, not the insert time;
    /// the two can drift when the persistence task lags.
    pub async fn insert(
        pool: &PgPool,
        event_type_id: DbId,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
        occurred_at: DateTime<Utc>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                (event_type_id, source_entity_type, source_entity_id, actor_user_id, \
                 payload, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(event_type_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .bind(occurred_at)
        .fetch_one(pool)
        .await
    }

    /// Recent events attached to one entity, newest first.
    pub async fn list_for_source(
        pool: &PgPool,
        source_entity_type: &str,
        source_entity_id: DbId,
        limit: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE source_entity_type = $1 AND source_entity_id = $2 \
             ORDER BY occurred_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(source_entity_type)
            .bind(source_entity_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
