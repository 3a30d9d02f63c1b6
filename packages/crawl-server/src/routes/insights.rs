use adaptive_strategy::{AdaptiveAnalytics, DomainInsights};
use axum::{
    extract::{Extension, Path},
    Json,
};

use super::ApiError;
use crate::app::AppState;

/// Learned metrics, top patterns and recommendations for one domain.
pub async fn insights_handler(
    Extension(state): Extension<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<DomainInsights>, ApiError> {
    Ok(Json(state.crawler.insights(&domain).await?))
}

/// Aggregate counts across every tracked domain.
pub async fn analytics_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<AdaptiveAnalytics>, ApiError> {
    Ok(Json(state.crawler.analytics().await?))
}
