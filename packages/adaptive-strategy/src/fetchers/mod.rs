//! Delegate fetcher implementations.
//!
//! - `HttpFetcher` - Direct HTTP fetch with HTML-to-markdown conversion
//! - `RateLimitedFetcher` - Wrapper that adds rate limiting

pub mod http;
pub mod rate_limited;

pub use http::HttpFetcher;
pub use rate_limited::{FetcherExt, RateLimitedFetcher};
