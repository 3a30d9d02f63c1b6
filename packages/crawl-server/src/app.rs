//! Application setup and router construction.

use std::sync::Arc;

use adaptive_strategy::{AdaptiveCrawler, DomainStore, PageFetcher, UrlValidator};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{
    analytics_handler, batch_crawl_handler, crawl_handler, health_handler, insights_handler,
    strategy_handler,
};

/// Crawler over type-erased store and fetcher, chosen at startup.
pub type SharedCrawler = AdaptiveCrawler<Arc<dyn DomainStore>, Arc<dyn PageFetcher>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<SharedCrawler>,

    /// Rejects private and malformed URLs before they reach the learner
    pub validator: Arc<UrlValidator>,
}

impl AppState {
    /// Create state with the default URL validator.
    pub fn new(crawler: SharedCrawler) -> Self {
        Self::with_validator(crawler, UrlValidator::new())
    }

    /// Create state with a custom URL validator.
    pub fn with_validator(crawler: SharedCrawler, validator: UrlValidator) -> Self {
        Self {
            crawler: Arc::new(crawler),
            validator: Arc::new(validator),
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api/crawl", post(crawl_handler))
        .route("/api/crawl/batch", post(batch_crawl_handler))
        .route("/api/strategy", get(strategy_handler))
        .route("/api/insights/:domain", get(insights_handler))
        .route("/api/analytics", get(analytics_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
