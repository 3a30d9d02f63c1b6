use adaptive_strategy::DomainStore;
use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    domains_tracked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK when the domain store answers within five seconds,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = state.crawler.learner().store();
    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        store.list_domains(),
    )
    .await
    {
        Ok(Ok(domains)) => StoreHealth {
            status: "ok".to_string(),
            domains_tracked: Some(domains.len()),
            error: None,
        },
        Ok(Err(e)) => StoreHealth {
            status: "error".to_string(),
            domains_tracked: None,
            error: Some(format!("Store query failed: {}", e)),
        },
        Err(_) => StoreHealth {
            status: "error".to_string(),
            domains_tracked: None,
            error: Some("Store timeout (>5s)".to_string()),
        },
    };

    let is_healthy = store_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            store: store_health,
        }),
    )
}
