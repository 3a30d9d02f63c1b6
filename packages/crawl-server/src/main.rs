// Main entry point for the crawl API server

use std::sync::Arc;

use adaptive_strategy::{
    AdaptiveCrawler, AdaptiveLearner, DomainStore, FetcherExt, HttpFetcher, MemoryStore,
    PageFetcher, SqliteStore,
};
use anyhow::{Context, Result};
use crawl_server::{build_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,adaptive_strategy=debug,crawl_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Adaptive Crawl API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Learned state: SQLite when configured, otherwise in memory
    let store: Arc<dyn DomainStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = SqliteStore::new(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");
            Arc::new(store)
        }
        None => {
            tracing::info!("No DATABASE_URL set, learned state will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    // Delegate fetcher, rate limited when configured
    let http = HttpFetcher::new().with_user_agent(config.fetch_user_agent.clone());
    let fetcher: Arc<dyn PageFetcher> = match config.fetch_requests_per_second {
        Some(rps) => {
            tracing::info!(requests_per_second = rps, "Upstream fetches rate limited");
            Arc::new(http.rate_limited(rps))
        }
        None => Arc::new(http),
    };

    let learner = AdaptiveLearner::with_config(store, config.learner.clone());
    let crawler = AdaptiveCrawler::new(learner, fetcher);

    // Build application
    let app = build_app(AppState::new(crawler), &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
