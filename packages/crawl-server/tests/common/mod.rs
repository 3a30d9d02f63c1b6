// Common test utilities

use std::sync::Arc;

use adaptive_strategy::{
    AdaptiveCrawler, AdaptiveLearner, DomainStore, MemoryStore, MockFetcher, PageFetcher,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use crawl_server::{build_app, AppState};
use serde_json::Value;
use tower::ServiceExt;

/// Router over an in-memory store and the given mock fetcher.
pub fn test_app(fetcher: MockFetcher) -> Router {
    let store: Arc<dyn DomainStore> = Arc::new(MemoryStore::new());
    let fetcher: Arc<dyn PageFetcher> = Arc::new(fetcher);
    let crawler = AdaptiveCrawler::new(AdaptiveLearner::new(store), fetcher);
    build_app(AppState::new(crawler), &[])
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, json: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}
