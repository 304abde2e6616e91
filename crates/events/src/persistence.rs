//! Event log writer.
//!
//! [`EventPersistence`] is the one bus subscriber that makes events
//! durable: it copies every [`DomainEvent`] it receives into the
//! `events` table. A failed insert is logged and skipped rather than
//! retried; the log is an audit trail, not a source of truth for any
//! state transition.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use fixline_core::types::DbId;
use fixline_db::repositories::EventRepo;
use fixline_db::DbPool;

use crate::bus::DomainEvent;

/// Background task that writes bus events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Consume `receiver` until the bus is dropped, persisting each event.
    ///
    /// Buffered events are still delivered after the sender goes away, so
    /// shutting down by dropping the [`EventBus`](crate::bus::EventBus)
    /// and then awaiting this task loses nothing that was already
    /// published.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event persistence fell behind; events lost");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match Self::persist(&pool, &event).await {
                Ok(id) => {
                    tracing::debug!(event_id = id, event_type = %event.event_type, "Event persisted");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        event_type = %event.event_type,
                        "Failed to persist event"
                    );
                }
            }
        }

        tracing::info!("Event bus closed, persistence shutting down");
    }

    /// Insert one event row.
    ///
    /// The name is resolved against the seeded `event_types` catalog
    /// first; an unknown name maps to `RowNotFound` so a typo in a
    /// publish site shows up in the error log instead of silently
    /// inventing a new type. Types seeded as critical (`run.failed`)
    /// are additionally surfaced at warn level.
    async fn persist(pool: &DbPool, event: &DomainEvent) -> Result<DbId, sqlx::Error> {
        let event_type = EventRepo::get_event_type_by_name(pool, &event.event_type)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        if event_type.is_critical {
            tracing::warn!(
                event_type = %event.event_type,
                source_entity_id = ?event.source_entity_id,
                "Critical event recorded"
            );
        }

        EventRepo::insert(
            pool,
            event_type.id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
            event.occurred_at,
        )
        .await
    }
}
