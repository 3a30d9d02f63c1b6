use adaptive_strategy::{BatchCrawlRequest, CrawlRequest, CrawlResponse, StrategyConfig};
use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;

use super::ApiError;
use crate::app::AppState;

/// Crawl one URL with an adaptively selected strategy.
///
/// A failed fetch still answers 200 with `success: false`; only invalid
/// requests are rejected.
pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<CrawlResponse>, ApiError> {
    request.validate(&state.validator)?;
    Ok(Json(state.crawler.crawl(&request).await))
}

/// Crawl many URLs under the batch concurrency ceiling.
pub async fn batch_crawl_handler(
    Extension(state): Extension<AppState>,
    Json(batch): Json<BatchCrawlRequest>,
) -> Result<Json<Vec<CrawlResponse>>, ApiError> {
    batch.validate(&state.validator)?;
    Ok(Json(state.crawler.crawl_batch(&batch).await))
}

#[derive(Debug, Deserialize)]
pub struct StrategyQuery {
    pub url: String,
}

/// Preview the strategy a crawl of `url` would use.
pub async fn strategy_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<StrategyQuery>,
) -> Result<Json<StrategyConfig>, ApiError> {
    CrawlRequest::new(query.url.as_str()).validate(&state.validator)?;
    Ok(Json(state.crawler.preview_strategy(&query.url, None).await))
}
