//! Typed errors for the adaptive strategy library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Degraded-but-normal
//! conditions (unknown domains, out-of-range tunables, empty history) are
//! never errors; they fall back to defaults or are clamped.

use thiserror::Error;

/// Errors surfaced by the learner and the crawl service.
#[derive(Debug, Error)]
pub enum AdaptiveError {
    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request rejected at the boundary
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Request URL failed validation
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdaptiveError {
    /// Wrap any error as a storage failure.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

/// Errors from the delegate page fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL rejected by validation
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Upstream returned a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Fetch exceeded the strategy's processing time
    #[error("timed out after {secs}s crawling {url}")]
    Timeout { url: String, secs: u64 },

    /// Page body exceeded the strategy's memory ceiling
    #[error("response from {url} exceeds the {limit_mb} MB limit")]
    TooLarge { url: String, limit_mb: u64 },

    /// Page yielded no extractable content
    #[error("no content extracted from {url}")]
    EmptyContent { url: String },
}

impl FetchError {
    /// True when the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// URL validation errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, metadata services)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for learner and service operations.
pub type Result<T> = std::result::Result<T, AdaptiveError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
