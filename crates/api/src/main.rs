use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fixline_api::config::ServerConfig;
use fixline_api::router::build_app_router;
use fixline_api::state::AppState;
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
                .unwrap_or_else(|_| "fixline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

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

    // Spawn the run dispatcher so queued preview/draft runs execute even
    // without a separate worker process.
    let dispatcher_cancel = CancellationToken::new();
    let dispatcher = RunDispatcher::new(pool.clone(), processor.clone())
        .with_poll_interval(Duration::from_millis(config.run_poll_interval_ms));
    let dispatcher_token = dispatcher_cancel.clone();
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(dispatcher_token).await;
    });

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: event_bus.clone(),
        processor,
    };

    let app = build_app_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid server address");

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the dispatcher before closing the bus: in-flight runs still
    // publish events while they finish.
    dispatcher_cancel.cancel();
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
