//! Standalone run worker.
//!
//! Runs the same dispatcher loop as the API binary without the HTTP
//! surface. Deployments that need more run throughput start additional
//! worker processes; `claim_next` guarantees each queued run is executed
//! by exactly one of them.

use std::sync::Arc;
use std::time::Duration;

use fixline_engine::{RunDispatcher, RunProcessor};
use fixline_events::{EventBus, EventPersistence};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    // Load .env file if present (development convenience).
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fixline_worker=debug,fixline_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database setup.
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL environment variable must be set");

    let pool = fixline_db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    fixline_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection established");

    // Migrations are normally applied by the API binary; running them here
    // too keeps a worker-only deployment self-sufficient.
    fixline_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // Event bus plus the persistence task that writes events to the DB.
    let event_bus = Arc::new(EventBus::default());
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    let processor = Arc::new(RunProcessor::new(pool.clone(), event_bus.clone()));
    let dispatcher = RunDispatcher::new(pool, processor);

    let cancel = CancellationToken::new();
    let dispatcher_token = cancel.clone();
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(dispatcher_token).await;
    });

    tracing::info!("Worker started, dispatching queued runs");

    shutdown_signal().await;

    // Stop the dispatcher before closing the bus: in-flight runs still
    // publish events while they finish.
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;
    tracing::info!("Run dispatcher stopped");

    // Drop our bus handle so the persistence task sees the channel close
    // and drains its remaining events.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Event persistence stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
