use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_server::{
    api::{create_router, AppState},
    config::Config,
    db::{Database, JsonFileStore},
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting todo server v{}...", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    let store = JsonFileStore::new(config.data_file.clone());
    let db = Database::open(Arc::new(store));
    tracing::info!("✅ Data store ready: {}", config.data_file.display());

    let state = AppState::new(db.clone(), config.clone());
    let app = create_router(state);

    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("  POST   /register   - Register new user");
    tracing::info!("  POST   /login      - Log in");
    tracing::info!("  POST   /logout     - Log out (requires auth)");
    tracing::info!("  GET    /me         - Current user (requires auth)");
    tracing::info!("  GET    /todos      - List todos (requires auth)");
    tracing::info!("  POST   /todos      - Create todo (requires auth)");
    tracing::info!("  PUT    /todos/:id  - Update todo (requires auth)");
    tracing::info!("  DELETE /todos/:id  - Delete todo (requires auth)");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    db.save();
    tracing::info!("👋 Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
