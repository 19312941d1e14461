//! Data models for the subscription aggregator.
//!
//! This module contains the core data structures shared across the
//! pipeline: the extraction variant, the decode strategy, classified
//! sources, the deduplicated link set, and the run summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// Browser User-Agent sent by the variants that identify themselves.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Which link shape to extract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// ss://, vmess://, trojan:// and vless:// links, one per line
    #[default]
    Proxies,
    /// IPv4 address rows followed by a `#` comment
    IpComment,
    /// vless:// links anywhere in the text
    Vless,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Proxies => write!(f, "proxies"),
            Variant::IpComment => write!(f, "ip-comment"),
            Variant::Vless => write!(f, "vless"),
        }
    }
}

impl Variant {
    /// Output file used when none is configured.
    pub fn default_output(&self) -> &'static str {
        match self {
            Variant::Proxies => "aggregated_proxies.txt",
            Variant::IpComment => "aggregated_ips.txt",
            Variant::Vless => "aggregated_vless.txt",
        }
    }

    /// Per-request timeout in seconds used when none is configured.
    pub fn default_timeout(&self) -> u64 {
        match self {
            Variant::Proxies | Variant::IpComment => 10,
            Variant::Vless => 15,
        }
    }

    /// User-Agent header used when none is configured.
    pub fn default_user_agent(&self) -> Option<&'static str> {
        match self {
            Variant::Proxies | Variant::Vless => Some(BROWSER_USER_AGENT),
            Variant::IpComment => None,
        }
    }

    /// Decode strategy used when none is configured.
    pub fn default_decode(&self) -> DecodeStrategy {
        match self {
            Variant::Proxies => DecodeStrategy::Precheck,
            Variant::IpComment | Variant::Vless => DecodeStrategy::Fallback,
        }
    }
}

/// How fetched content is checked for a Base64 wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeStrategy {
    /// Decode first if the body looks like Base64, else treat as plain text
    Precheck,
    /// Extract from plain text first, decode only if nothing was found
    Fallback,
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStrategy::Precheck => write!(f, "precheck"),
            DecodeStrategy::Fallback => write!(f, "fallback"),
        }
    }
}

/// One line of the source list after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Already a link in the target format.
    Direct(String),
    /// A URL whose body has to be fetched.
    Remote(Url),
    /// Neither of the above.
    Invalid(String),
}

impl Source {
    /// Short label for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Direct(_) => "direct",
            Source::Remote(_) => "remote",
            Source::Invalid(_) => "invalid",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Direct(link) => write!(f, "{}", link),
            Source::Remote(url) => write!(f, "{}", url),
            Source::Invalid(raw) => write!(f, "{}", raw),
        }
    }
}

/// Deduplicated set of links, kept in ascending byte order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: BTreeSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link after trimming surrounding whitespace.
    ///
    /// Returns `true` if the link was not already present. Blank input is
    /// ignored.
    pub fn insert(&mut self, link: &str) -> bool {
        let link = link.trim();
        if link.is_empty() {
            return false;
        }
        self.links.insert(link.to_string())
    }

    /// Insert every link, returning how many were new.
    pub fn extend<I, S>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        links
            .into_iter()
            .filter(|link| self.insert(link.as_ref()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterate in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-comment lines read from the source list.
    pub sources: usize,
    /// Sources kept verbatim as direct links.
    pub direct: usize,
    /// Remote sources fetched and processed.
    pub fetched: usize,
    /// Remote sources that failed or returned nothing usable.
    pub failed: usize,
    /// Lines that were neither a link nor a URL.
    pub skipped: usize,
    /// Unique links after deduplication.
    pub unique_links: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_set_trims_and_dedups() {
        let mut set = LinkSet::new();
        assert!(set.insert("vless://a@host:443"));
        assert!(!set.insert("  vless://a@host:443\t"));
        assert!(!set.insert("   "));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next(), Some("vless://a@host:443"));
    }

    #[test]
    fn test_link_set_sorted_iteration() {
        let mut set = LinkSet::new();
        let added = set.extend(["vmess://b", "ss://c", "trojan://a", "ss://c"]);
        assert_eq!(added, 3);

        let links: Vec<_> = set.iter().collect();
        assert_eq!(links, vec!["ss://c", "trojan://a", "vmess://b"]);
    }

    #[test]
    fn test_variant_defaults() {
        assert_eq!(Variant::default(), Variant::Proxies);
        assert_eq!(Variant::Proxies.default_output(), "aggregated_proxies.txt");
        assert_eq!(Variant::Vless.default_output(), "aggregated_vless.txt");
        assert_eq!(Variant::Proxies.default_timeout(), 10);
        assert_eq!(Variant::Vless.default_timeout(), 15);
        assert!(Variant::IpComment.default_user_agent().is_none());
        assert_eq!(
            Variant::Vless.default_user_agent(),
            Some(BROWSER_USER_AGENT)
        );
        assert_eq!(Variant::Proxies.default_decode(), DecodeStrategy::Precheck);
        assert_eq!(Variant::Vless.default_decode(), DecodeStrategy::Fallback);
    }

    #[test]
    fn test_source_kind() {
        let url = Url::parse("https://example.com/sub").unwrap();
        assert_eq!(Source::Remote(url).kind(), "remote");
        assert_eq!(Source::Direct("ss://x".to_string()).kind(), "direct");
        assert_eq!(Source::Invalid("nope".to_string()).to_string(), "nope");
    }
}
