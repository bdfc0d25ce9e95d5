//! Pulse API server binary entrypoint.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pulse_common::config::AppConfig;
use pulse_engine::Dispatcher;
use pulse_notifier::build_sender;
use pulse_store::NotificationStore;

use pulse_api::routes::create_router;
use pulse_api::state::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pulse_api=debug,pulse_store=debug,pulse_engine=debug,tower_http=debug")
    });
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting Pulse API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Open the notification store
    let store = NotificationStore::open_path(config.store_backend, &config.store_path).await?;
    tracing::info!(
        path = %config.store_path.display(),
        backend = ?config.store_backend,
        "Notification store ready"
    );

    // Wire up email delivery
    let sender = build_sender(&config)?;
    let dispatcher = Dispatcher::from_config(sender, &config);

    // Build application state
    let addr = config.bind_addr;
    let state = AppState::new(Arc::new(store), dispatcher, config);

    // Build router
    let app = create_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    tracing::info!("Pulse API server stopped.");
    Ok(())
}
