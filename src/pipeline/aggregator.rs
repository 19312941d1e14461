//! Source aggregation.
//!
//! Sources are processed strictly in order, one at a time. A failing source
//! is logged and counted, and the loop moves on to the next one.

use crate::extract::Extractor;
use crate::fetch::{FetchError, Fetcher};
use crate::models::{DecodeStrategy, LinkSet, RunSummary, Source};
use crate::sources;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single source contributed nothing.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not a link or a valid URL: {0}")]
    Invalid(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{0} returned an empty body")]
    EmptyBody(String),

    #[error("no HTTP client available to fetch {0}")]
    NoClient(String),
}

/// Runs the pipeline over a list of sources.
///
/// Without a fetcher every remote source fails and only direct links are
/// collected.
pub struct Aggregator {
    fetcher: Option<Fetcher>,
    extractor: Extractor,
    strategy: DecodeStrategy,
    show_progress: bool,
}

impl Aggregator {
    pub fn new(fetcher: Option<Fetcher>, extractor: Extractor, strategy: DecodeStrategy) -> Self {
        Self {
            fetcher,
            extractor,
            strategy,
            show_progress: false,
        }
    }

    /// Draw a progress bar while sources are processed.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Produce the links contributed by one source.
    pub async fn process_source(&self, source: &Source) -> Result<Vec<String>, SourceError> {
        match source {
            Source::Direct(link) => Ok(vec![link.clone()]),
            Source::Invalid(raw) => Err(SourceError::Invalid(raw.clone())),
            Source::Remote(url) => {
                let fetcher = self
                    .fetcher
                    .as_ref()
                    .ok_or_else(|| SourceError::NoClient(url.to_string()))?;
                let content = fetcher.fetch(url).await?;
                if content.is_empty() {
                    return Err(SourceError::EmptyBody(url.to_string()));
                }
                Ok(self.extractor.extract_content(&content, self.strategy))
            }
        }
    }

    /// Process every source and collect the deduplicated links.
    pub async fn run(&self, lines: &[String]) -> (LinkSet, RunSummary) {
        let mut links = LinkSet::new();
        let mut summary = RunSummary {
            sources: lines.len(),
            ..RunSummary::default()
        };

        let progress = self.progress_bar(lines.len());

        for line in lines {
            let source = sources::classify(line, &self.extractor);
            progress.set_message(truncate(line, 48));

            match self.process_source(&source).await {
                Ok(found) => match source {
                    Source::Direct(_) => {
                        summary.direct += 1;
                        links.extend(&found);
                        debug!("Added direct link: {}", truncate(line, 50));
                    }
                    _ => {
                        summary.fetched += 1;
                        let added = links.extend(&found);
                        if found.is_empty() {
                            info!("No {} links found in {}", self.extractor.variant(), source);
                        } else {
                            info!(
                                "Found {} links in {} ({} new)",
                                found.len(),
                                source,
                                added
                            );
                        }
                    }
                },
                Err(SourceError::Invalid(raw)) => {
                    summary.skipped += 1;
                    warn!("Skipping invalid source: {}", raw);
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Failed to get content: {}", e);
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        summary.unique_links = links.len();
        (links, summary)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
