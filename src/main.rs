use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use next_page_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, Cache},
    services::{
        providers::{CatalogProvider, GoogleBooksProvider},
        store::PgReaderStore,
        ReaderStores, RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);

    let catalog: Arc<dyn CatalogProvider> = Arc::new(GoogleBooksProvider::new(
        cache,
        config.google_books_api_url.clone(),
        config.google_books_api_key.clone(),
    ));
    let store = Arc::new(PgReaderStore::new(pool));

    let engine = RecommendationEngine::new(
        catalog.clone(),
        ReaderStores {
            preferences: store.clone(),
            reading_patterns: store.clone(),
            genre_weights: store.clone(),
            similar_books: store.clone(),
        },
    )
    .with_genre_candidate_limit(config.genre_candidate_limit);

    let app = create_router(AppState::new(engine, catalog, store.clone(), store));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
