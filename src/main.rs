use review_service::api::{self, AppState};
use review_service::config::{AppConfig, StoreBackend};
use review_service::models::Review;
use review_service::seed;
use review_service::storage::{DocumentStore, JsonlStore, MemoryStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("🚀 Starting Review Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Store: {}", config.storage.backend);
    info!("   - Data dir: {}", config.storage.data_dir.display());
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Open the reviews collection
    info!("💾 Opening document store...");
    let reviews: Arc<dyn DocumentStore<Review>> = match config.storage.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::<Review>::new()),
        StoreBackend::Jsonl => Arc::new(JsonlStore::<Review>::open(&config.storage.data_dir)?),
    };
    info!("✅ Document store ready ({} reviews)", reviews.count()?);

    // Seed after the store is reachable, every start
    seed::seed_reviews(reviews.as_ref())?;

    let app = api::router(AppState::new(reviews));

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /health             - Health check");
    info!("   GET    /api/reviews        - List reviews");
    info!("   POST   /api/reviews        - Create review");
    info!("   PUT    /api/reviews/{{id}}   - Replace (or create) review");
    info!("   DELETE /api/reviews/{{id}}   - Delete review");
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
