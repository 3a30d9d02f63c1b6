//! Domain classifier.
//!
//! Buckets a host into a [`ContentType`] with substring heuristics. Lists are
//! checked in priority order and the first match wins, so a host matching
//! both the news and technical lists is news. Names too short to be safe as
//! substrings are matched as whole hosts instead.

use crate::types::strategy::ContentType;

/// Keywords that suggest a news site.
const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "cnn",
    "bbc",
    "reuters",
    "nytimes",
    "guardian",
    "bloomberg",
    "wsj",
    "coindesk",
    "cointelegraph",
    "theblock",
    "decrypt",
];

/// Keywords that suggest a social network.
const SOCIAL_KEYWORDS: &[&str] = &[
    "twitter",
    "facebook",
    "instagram",
    "linkedin",
    "reddit",
    "tiktok",
    "youtube",
    "telegram",
    "discord",
];

/// Social hosts matched exactly or as a parent domain.
const SOCIAL_HOSTS: &[&str] = &["x.com"];

/// Keywords that suggest technical documentation or code hosting.
const TECHNICAL_KEYWORDS: &[&str] = &[
    "github",
    "gitlab",
    "stackoverflow",
    "stackexchange",
    "docs.",
    "developer",
    "dev.",
    "api.",
    "readthedocs",
    "etherscan",
];

/// Keywords that suggest a shop or exchange listing.
const ECOMMERCE_KEYWORDS: &[&str] = &[
    "shop",
    "store",
    "amazon",
    "ebay",
    "etsy",
    "buy",
    "cart",
    "market",
];

/// Keywords that suggest a discussion board.
const FORUM_KEYWORDS: &[&str] = &[
    "forum",
    "community",
    "discourse",
    "bitcointalk",
    "board",
];

/// Classification lists in priority order.
const PRIORITY: &[(ContentType, &[&str], &[&str])] = &[
    (ContentType::News, NEWS_KEYWORDS, &[]),
    (ContentType::Social, SOCIAL_KEYWORDS, SOCIAL_HOSTS),
    (ContentType::Technical, TECHNICAL_KEYWORDS, &[]),
    (ContentType::Ecommerce, ECOMMERCE_KEYWORDS, &[]),
    (ContentType::Forum, FORUM_KEYWORDS, &[]),
];

/// `host` is `domain` itself or one of its subdomains.
fn is_host_or_subdomain(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
}

/// Classify a host. Never fails; unmatched hosts are blogs.
pub fn classify(host: &str) -> ContentType {
    let host = host.to_lowercase();

    PRIORITY
        .iter()
        .find(|(_, keywords, hosts)| {
            keywords.iter().any(|k| host.contains(k))
                || hosts.iter().any(|h| is_host_or_subdomain(&host, h))
        })
        .map(|(content_type, _, _)| *content_type)
        .unwrap_or(ContentType::Blog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_hosts() {
        for host in ["cnn.com", "bbc.co.uk", "coindesk.com", "localnews.org"] {
            assert_eq!(classify(host), ContentType::News, "Expected News for: {}", host);
        }
    }

    #[test]
    fn test_social_hosts() {
        for host in ["twitter.com", "reddit.com", "www.linkedin.com", "x.com", "mobile.x.com"] {
            assert_eq!(classify(host), ContentType::Social, "Expected Social for: {}", host);
        }
    }

    #[test]
    fn test_short_social_names_need_whole_host() {
        for host in ["netflix.com", "dropbox.com", "box.com", "fox.com"] {
            assert_ne!(classify(host), ContentType::Social, "Unexpected Social for: {}", host);
        }
        assert_eq!(classify("netflix.com"), ContentType::Blog);
    }

    #[test]
    fn test_technical_hosts() {
        for host in ["github.com", "docs.rs", "api.coingecko.com"] {
            assert_eq!(
                classify(host),
                ContentType::Technical,
                "Expected Technical for: {}",
                host
            );
        }
    }

    #[test]
    fn test_ecommerce_and_forum_hosts() {
        assert_eq!(classify("amazon.com"), ContentType::Ecommerce);
        assert_eq!(classify("bitcointalk.org"), ContentType::Forum);
    }

    #[test]
    fn test_news_beats_technical() {
        // Matches "news" and "developer"
        assert_eq!(classify("developer-news.io"), ContentType::News);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("GitHub.COM"), ContentType::Technical);
    }

    #[test]
    fn test_fallback_is_blog() {
        assert_eq!(classify("example.com"), ContentType::Blog);
        assert_eq!(classify("slow-site.com"), ContentType::Blog);
        assert_eq!(classify(""), ContentType::Blog);
    }
}
