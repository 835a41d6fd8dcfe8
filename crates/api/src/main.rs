use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comanda_api::config::ServerConfig;
use comanda_api::router::build_app_router;
use comanda_api::state::AppState;
use comanda_catalog::{CatalogClient, SyncEngine};
use comanda_core::vault::Vault;
use comanda_events::{Dispatcher, WebhookProcessor};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comanda_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = comanda_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    comanda_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    comanda_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Credential vault ---
    let vault = Arc::new(Vault::from_env().expect("Failed to load credential vault key"));
    tracing::info!("Credential vault loaded");

    // --- Catalog engine ---
    let client = match &config.catalog_api_base_url {
        Some(base_url) => CatalogClient::with_base_url(base_url),
        None => CatalogClient::new(),
    };
    let engine = Arc::new(SyncEngine::new(client));

    // --- Dispatcher ---
    let dispatcher = Arc::new(Dispatcher::default());

    // Spawn the webhook processor (consumes verified entries).
    let processor_handle = tokio::spawn(WebhookProcessor::run(
        pool.clone(),
        dispatcher.subscribe(),
    ));
    tracing::info!("Webhook processor started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        vault,
        dispatcher: Arc::clone(&dispatcher),
        engine,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Drop the dispatcher sender to close the broadcast channel. This
    // signals the webhook processor to shut down.
    drop(dispatcher);
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        processor_handle,
    )
    .await;
    tracing::info!("Webhook processor shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
