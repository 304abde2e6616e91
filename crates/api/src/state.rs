use std::sync::Arc;

use fixline_engine::RunProcessor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fixline_db::DbPool,
    /// Server configuration (JWT secret, timeouts, CORS origins).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<fixline_events::EventBus>,
    /// Run processor driving the synchronous apply endpoint. Queued
    /// preview/draft runs are picked up by the background dispatcher.
    pub processor: Arc<RunProcessor>,
}
