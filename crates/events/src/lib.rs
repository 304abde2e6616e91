//! Fixline event bus and persistence infrastructure.
//!
//! Everything noteworthy that happens to a run, draft, approval, or
//! export is announced on an in-process bus and durably recorded:
//!
//! - [`EventBus`] -- publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the canonical event envelope.
//! - [`EventPersistence`] -- background service that writes every event
//!   to the `events` table.
//! - [`names`] -- the catalog of recognised event type names.

pub mod bus;
pub mod names;
pub mod persistence;

pub use bus::{DomainEvent, EventBus};
pub use persistence::EventPersistence;
