//! URL validation at the crawl boundary (SSRF protection).

use std::collections::HashSet;
use std::net::IpAddr;

use crate::error::{SecurityError, SecurityResult};

/// Hosts that are never crawled.
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "::1",
    "[::1]",
    "0.0.0.0",
    "metadata.google.internal",
    "metadata.gke.internal",
    "instance-data",
];

/// Private, loopback and link-local ranges.
const BLOCKED_CIDRS: &[&str] = &[
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "169.254.0.0/16",
    "127.0.0.0/8",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
];

/// Validates crawl targets before any fetch happens.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    allowed_schemes: HashSet<String>,
    blocked_hosts: HashSet<String>,
    blocked_cidrs: Vec<ipnet::IpNet>,

    /// Hosts that bypass the block lists
    allowed_hosts: HashSet<String>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlValidator {
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
            blocked_cidrs: BLOCKED_CIDRS
                .iter()
                .filter_map(|cidr| cidr.parse().ok())
                .collect(),
            allowed_hosts: HashSet::new(),
        }
    }

    /// Let a host through regardless of the block lists (tests, local mirrors).
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into());
        self
    }

    /// Check scheme, host and literal IP ranges.
    pub fn validate(&self, url: &str) -> SecurityResult<()> {
        let parsed = url::Url::parse(url)?;

        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(SecurityError::DisallowedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host_str().ok_or(SecurityError::NoHost)?;
        if self.allowed_hosts.contains(host) {
            return Ok(());
        }
        if self.blocked_hosts.contains(host) {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }

        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            self.check_ip(ip)?;
        }

        Ok(())
    }

    /// Like [`validate`](Self::validate), then resolve DNS and check every address.
    pub async fn validate_with_dns(&self, url: &str) -> SecurityResult<()> {
        self.validate(url)?;

        let parsed = url::Url::parse(url)?;
        let host = parsed.host_str().ok_or(SecurityError::NoHost)?;
        if self.allowed_hosts.contains(host) || host.parse::<IpAddr>().is_ok() {
            return Ok(());
        }

        let port = parsed.port_or_known_default().unwrap_or(80);
        // Resolution failures are left to the fetch itself to report.
        if let Ok(addrs) = tokio::net::lookup_host((host, port)).await {
            for addr in addrs {
                self.check_ip(addr.ip())?;
            }
        }

        Ok(())
    }

    fn check_ip(&self, ip: IpAddr) -> SecurityResult<()> {
        match self.blocked_cidrs.iter().find(|cidr| cidr.contains(&ip)) {
            Some(_) => Err(SecurityError::BlockedCidr(ip.to_string())),
            None => Ok(()),
        }
    }
}

/// Host portion of a URL, lower-cased, without a leading `www.`.
///
/// Returns an empty string for anything unparseable; callers treat that as
/// an unknown domain.
pub fn domain_of(url: &str) -> String {
    // "host:port/path" parses with the host as its scheme, so retry on a
    // missing host as well as on a parse error.
    let host_of = |candidate: &str| {
        url::Url::parse(candidate)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    };
    host_of(url)
        .or_else(|| host_of(&format!("https://{}", url)))
        .map(|h| h.trim_start_matches("www.").to_string())
        .unwrap_or_default()
}
