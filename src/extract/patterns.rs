//! Per-variant link patterns.
//!
//! The line-anchored variants keep every trimmed line whose start matches
//! the pattern. The vless variant searches for links anywhere in the text.

use crate::extract::decode::{decode_base64, looks_like_base64};
use crate::models::{DecodeStrategy, Variant};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static PROXY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ss|vmess|trojan|vless)://[^s]+").expect("valid regex"));

static IP_COMMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}#.*$").expect("valid regex"));

static VLESS_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"vless://[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+").expect("valid regex")
});

/// Extracts links of one variant from text.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    variant: Variant,
}

impl Extractor {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn pattern(&self) -> &'static Regex {
        match self.variant {
            Variant::Proxies => &*PROXY_LINE,
            Variant::IpComment => &*IP_COMMENT_LINE,
            Variant::Vless => &*VLESS_LINK,
        }
    }

    /// Whether a source line is already a link of this variant.
    pub fn is_direct_link(&self, line: &str) -> bool {
        self.pattern()
            .find(line.trim())
            .is_some_and(|m| m.start() == 0)
    }

    /// Extract every matching link from `text`, trimmed, in order of
    /// appearance. Duplicates are left for the caller's set to absorb.
    pub fn extract(&self, text: &str) -> Vec<String> {
        match self.variant {
            Variant::Proxies | Variant::IpComment => text
                .lines()
                .map(str::trim)
                .filter(|line| self.pattern().is_match(line))
                .map(String::from)
                .collect(),
            Variant::Vless => VLESS_LINK
                .find_iter(text)
                .map(|m| m.as_str().trim().to_string())
                .collect(),
        }
    }

    /// Extract links from a fetched body, unwrapping Base64 per `strategy`.
    pub fn extract_content(&self, content: &str, strategy: DecodeStrategy) -> Vec<String> {
        match strategy {
            DecodeStrategy::Precheck => {
                if !looks_like_base64(content) {
                    debug!("Content treated as plain text");
                    return self.extract(content);
                }
                match decode_base64(content) {
                    Ok(decoded) => {
                        debug!("Decoded Base64 content ({} bytes)", decoded.len());
                        self.extract(&decoded)
                    }
                    Err(e) => {
                        debug!("Base64 decode failed ({}), treating as plain text", e);
                        self.extract(content)
                    }
                }
            }
            DecodeStrategy::Fallback => {
                let direct = self.extract(content);
                if !direct.is_empty() {
                    return direct;
                }
                match decode_base64(content) {
                    Ok(decoded) => self.extract(&decoded),
                    Err(e) => {
                        debug!("No plain links and Base64 decode failed: {}", e);
                        Vec::new()
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_lines() {
        let extractor = Extractor::new(Variant::Proxies);
        let text = "  vmess://abc123  \nhello\nss://Y2hhY2hh@1.2.3.4:80\ntrojan://pw@host:443\nhttp://x";
        assert_eq!(
            extractor.extract(text),
            vec![
                "vmess://abc123",
                "ss://Y2hhY2hh@1.2.3.4:80",
                "trojan://pw@host:443"
            ]
        );
    }

    #[test]
    fn test_proxy_requires_non_s_after_scheme() {
        let extractor = Extractor::new(Variant::Proxies);
        assert!(extractor.extract("ss://sss").is_empty());
        assert!(extractor.extract("ssr://abc").is_empty());
    }

    #[test]
    fn test_ip_comment_lines() {
        let extractor = Extractor::new(Variant::IpComment);
        let text = "1.2.3.4#US node\n10.0.0.1\n 192.168.1.20#HK \nfoo 1.1.1.1#x";
        assert_eq!(
            extractor.extract(text),
            vec!["1.2.3.4#US node", "192.168.1.20#HK"]
        );
    }

    #[test]
    fn test_vless_substring_search() {
        let extractor = Extractor::new(Variant::Vless);
        let text = "links: vless://id@a.com:443?type=ws#tag1 and <vless://id@b.com:80>";
        assert_eq!(
            extractor.extract(text),
            vec!["vless://id@a.com:443?type=ws#tag1", "vless://id@b.com:80"]
        );
    }

    #[test]
    fn test_is_direct_link() {
        let proxies = Extractor::new(Variant::Proxies);
        assert!(proxies.is_direct_link("vless://abc123@host:443?x=1"));
        assert!(!proxies.is_direct_link("https://example.com/sub"));

        let vless = Extractor::new(Variant::Vless);
        assert!(vless.is_direct_link(" vless://abc123@host:443?x=1 "));
        assert!(!vless.is_direct_link("see vless://abc123@host"));

        let ips = Extractor::new(Variant::IpComment);
        assert!(ips.is_direct_link("8.8.8.8#dns"));
        assert!(!ips.is_direct_link("8.8.8.8"));
    }

    #[test]
    fn test_precheck_decodes_base64() {
        let extractor = Extractor::new(Variant::Proxies);
        // "vless://foo\nvless://bar"
        let encoded = "dmxlc3M6Ly9mb28Kdmxlc3M6Ly9iYXI=";
        assert_eq!(
            extractor.extract_content(encoded, DecodeStrategy::Precheck),
            vec!["vless://foo", "vless://bar"]
        );
    }

    #[test]
    fn test_precheck_plain_text() {
        let extractor = Extractor::new(Variant::Proxies);
        let links = extractor.extract_content("vmess://abc", DecodeStrategy::Precheck);
        assert_eq!(links, vec!["vmess://abc"]);
    }

    #[test]
    fn test_fallback_prefers_plain_links() {
        let extractor = Extractor::new(Variant::Vless);
        let links = extractor.extract_content("vless://plain@h:1", DecodeStrategy::Fallback);
        assert_eq!(links, vec!["vless://plain@h:1"]);

        let encoded = "dmxlc3M6Ly9mb28Kdmxlc3M6Ly9iYXI=";
        let links = extractor.extract_content(encoded, DecodeStrategy::Fallback);
        assert_eq!(links, vec!["vless://foo", "vless://bar"]);

        assert!(extractor
            .extract_content("nothing here!", DecodeStrategy::Fallback)
            .is_empty());
    }
}
