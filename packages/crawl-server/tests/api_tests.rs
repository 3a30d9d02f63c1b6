//! HTTP API tests driving the router in-process with a mock fetcher.

mod common;

use adaptive_strategy::{testing::sample_article, FetchedPage, MockFetcher};
use axum::http::StatusCode;
use common::{get, post_json, test_app};

#[tokio::test]
async fn test_health() {
    let app = test_app(MockFetcher::new());

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["domains_tracked"], 0);
}

#[tokio::test]
async fn test_crawl_returns_adaptive_metadata() {
    let fetcher = MockFetcher::new().with_page(
        FetchedPage::new("https://cnn.com/world", sample_article(400)).with_title("World"),
    );
    let app = test_app(fetcher);

    let (status, body) = post_json(&app, "/api/crawl", r#"{"url": "https://cnn.com/world"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["title"], "World");
    assert_eq!(body["metadata"]["strategy_used"], "hybrid");
    assert_eq!(body["metadata"]["content_type"], "news");
    assert_eq!(body["metadata"]["adaptation_applied"], false);
}

#[tokio::test]
async fn test_failed_fetch_is_still_200() {
    let app = test_app(MockFetcher::new().fail_url("https://down.example.org/"));

    let (status, body) =
        post_json(&app, "/api/crawl", r#"{"url": "https://down.example.org/"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert_eq!(body["metadata"]["stopping_reason"], "fetch_failed");
}

#[tokio::test]
async fn test_private_url_rejected() {
    let app = test_app(MockFetcher::new());

    let (status, body) = post_json(&app, "/api/crawl", r#"{"url": "http://127.0.0.1/admin"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_threshold_rejected() {
    let app = test_app(MockFetcher::new());

    let (status, _) = post_json(
        &app,
        "/api/crawl",
        r#"{"url": "https://cnn.com", "strategy": {"similarity_threshold": "0.9x"}}"#,
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_override_field_rejected() {
    let app = test_app(MockFetcher::new());

    let (status, _) = post_json(
        &app,
        "/api/crawl",
        r#"{"url": "https://cnn.com", "strategy": {"turbo": true}}"#,
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_batch_crawl() {
    let app = test_app(MockFetcher::new().fail_url("https://b.org/"));

    let (status, body) = post_json(
        &app,
        "/api/crawl/batch",
        r#"{"urls": ["https://a.org/", "https://b.org/"], "strategy": {"max_concurrency": 1}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let responses = body.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["success"], true);
    assert_eq!(responses[1]["success"], false);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let app = test_app(MockFetcher::new());

    let (status, _) = post_json(&app, "/api/crawl/batch", r#"{"urls": []}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_strategy_preview() {
    let app = test_app(MockFetcher::new());

    let (status, body) = get(&app, "/api/strategy?url=https://twitter.com/someone").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "embedding");
    assert_eq!(body["min_word_count"], 50);
}

#[tokio::test]
async fn test_insights_and_analytics_after_crawl() {
    let app = test_app(MockFetcher::new());

    let (_, body) = get(&app, "/api/insights/example.com").await;
    assert!(body["metrics"].is_null());

    post_json(&app, "/api/crawl", r#"{"url": "https://example.com/post"}"#).await;

    let (status, body) = get(&app, "/api/insights/example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["metrics"]["total_crawls"], 1);
    assert!(body["recommendations"].as_array().unwrap().len() >= 1);

    let (status, body) = get(&app, "/api/analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domains_tracked"], 1);
    assert_eq!(body["total_crawls"], 1);
}
