//! HTTP delegate fetcher.
//!
//! Fetches a page with reqwest and converts HTML to markdown with a few
//! regex passes. For JavaScript-heavy sites plug in a headless-browser
//! fetcher behind [`PageFetcher`] instead.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::security::UrlValidator;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::strategy::StrategyConfig;

/// Compiled HTML-to-markdown passes.
struct MarkdownRules {
    script: Regex,
    style: Regex,
    title: Regex,
    h1: Regex,
    h2: Regex,
    h3: Regex,
    paragraph: Regex,
    line_break: Regex,
    link: Regex,
    list_item: Regex,
    tag: Regex,
    blank_lines: Regex,
}

fn rules() -> &'static MarkdownRules {
    static RULES: OnceLock<MarkdownRules> = OnceLock::new();
    RULES.get_or_init(|| MarkdownRules {
        script: Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static regex"),
        style: Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("static regex"),
        title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("static regex"),
        h1: Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("static regex"),
        h2: Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").expect("static regex"),
        h3: Regex::new(r"(?is)<h3[^>]*>(.*?)</h3>").expect("static regex"),
        paragraph: Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("static regex"),
        line_break: Regex::new(r"(?i)<br\s*/?>").expect("static regex"),
        link: Regex::new(r#"(?is)<a[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#)
            .expect("static regex"),
        list_item: Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("static regex"),
        tag: Regex::new(r"<[^>]+>").expect("static regex"),
        blank_lines: Regex::new(r"\n{3,}").expect("static regex"),
    })
}

/// Convert HTML to markdown (simplified).
pub fn html_to_markdown(html: &str) -> String {
    let r = rules();
    let mut text = r.script.replace_all(html, "").into_owned();
    text = r.style.replace_all(&text, "").into_owned();
    text = r.title.replace_all(&text, "").into_owned();

    text = r.h1.replace_all(&text, "\n# $1\n\n").into_owned();
    text = r.h2.replace_all(&text, "\n## $1\n\n").into_owned();
    text = r.h3.replace_all(&text, "\n### $1\n\n").into_owned();
    text = r.paragraph.replace_all(&text, "$1\n\n").into_owned();
    text = r.line_break.replace_all(&text, "\n").into_owned();
    text = r.link.replace_all(&text, "[$2]($1)").into_owned();
    text = r.list_item.replace_all(&text, "- $1\n").into_owned();
    text = r.tag.replace_all(&text, "").into_owned();

    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    r.blank_lines
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Extract the `<title>` text.
pub fn extract_title(html: &str) -> Option<String> {
    rules()
        .title
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Smart stopping: cut content at `max_words` words, keeping line structure.
pub fn truncate_words(content: &str, max_words: usize) -> String {
    let mut remaining = max_words;
    let mut kept = Vec::new();
    for line in content.lines() {
        if remaining == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() <= remaining {
            remaining -= words.len();
            kept.push(line.to_string());
        } else {
            kept.push(words[..remaining].join(" "));
            remaining = 0;
        }
    }
    kept.join("\n").trim_end().to_string()
}

/// Buffer a response body, giving up once it passes the strategy's memory
/// ceiling.
async fn read_body(
    url: &str,
    mut response: reqwest::Response,
    strategy: &StrategyConfig,
) -> FetchResult<String> {
    let limit = strategy.body_limit_bytes();
    let too_large = || FetchError::TooLarge {
        url: url.to_string(),
        limit_mb: strategy.limits.memory_limit_mb,
    };

    if response.content_length().is_some_and(|len| len > limit) {
        warn!(url = %url, limit_bytes = limit, "Declared body exceeds memory limit");
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::Http(Box::new(e)))?
    {
        if (body.len() + chunk.len()) as u64 > limit {
            warn!(url = %url, limit_bytes = limit, "Body exceeded memory limit while streaming");
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Fetches pages over plain HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    validator: UrlValidator,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: "AdaptiveCrawler/1.0".to_string(),
            validator: UrlValidator::new(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_validator(mut self, validator: UrlValidator) -> Self {
        self.validator = validator;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, strategy: &StrategyConfig) -> FetchResult<FetchedPage> {
        self.validator.validate_with_dns(url).await?;

        let timeout = strategy.page_timeout();
        debug!(url = %url, timeout_secs = timeout.as_secs(), "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                        secs: timeout.as_secs(),
                    }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let mut metadata: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (format!("http_{}", k.as_str()), v.to_string()))
            })
            .collect();
        metadata.insert("http_status".to_string(), status.as_u16().to_string());

        let html = read_body(url, response, strategy).await?;

        let mut content = html_to_markdown(&html);
        if content.is_empty() {
            return Err(FetchError::EmptyContent {
                url: url.to_string(),
            });
        }
        if strategy.smart_stopping {
            content = truncate_words(&content, strategy.max_word_count);
        }

        let mut page = FetchedPage::new(final_url, content);
        page.title = extract_title(&html);
        page.metadata = metadata;

        debug!(url = %url, content_length = page.content.len(), "Page fetched");
        Ok(page)
    }
}
