//! Source list loading and classification.
//!
//! A source list is a UTF-8 text file with one source per line. Blank lines
//! and lines starting with `#` are ignored.

use crate::extract::Extractor;
use crate::models::Source;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// Read the non-empty, non-comment lines of a source list.
///
/// A missing or unreadable file is logged and yields no sources.
pub fn read_sources(path: &Path) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Sources file '{}' not found", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to read sources file {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let sources = parse_sources(&content);
    info!("Read {} sources from {}", sources.len(), path.display());
    sources
}

/// Split source list text into trimmed entries, skipping blanks and comments.
pub fn parse_sources(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Parse `candidate` as a URL with both a scheme and a host.
fn parse_remote(candidate: &str) -> Option<Url> {
    Url::parse(candidate)
        .ok()
        .filter(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

/// Decide how a source line is handled.
///
/// Direct links win over URLs, so a link that also parses as a URL is
/// kept verbatim rather than fetched.
pub fn classify(line: &str, extractor: &Extractor) -> Source {
    let line = line.trim();

    if extractor.is_direct_link(line) {
        return Source::Direct(line.to_string());
    }

    match parse_remote(line) {
        Some(url) => Source::Remote(url),
        None => Source::Invalid(line.to_string()),
    }
}
