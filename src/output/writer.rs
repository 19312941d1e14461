//! Writes the aggregated link list.
//!
//! The output is one link per line in ascending byte order, each line
//! terminated by `\n`. An empty set produces a zero-byte file so stale
//! results never survive a run.

use crate::models::LinkSet;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Render links as newline-terminated lines.
pub fn render_links(links: &LinkSet) -> String {
    let mut out = String::new();
    for link in links.iter() {
        out.push_str(link);
        out.push('\n');
    }
    out
}

/// Overwrite `path` with the rendered links. Returns the number written.
pub fn write_links(path: &Path, links: &LinkSet) -> Result<usize> {
    std::fs::write(path, render_links(links))
        .with_context(|| format!("Failed to write links to {}", path.display()))?;

    if links.is_empty() {
        info!("Created/cleared {} (no links found)", path.display());
    } else {
        info!("Wrote {} links to {}", links.len(), path.display());
    }

    Ok(links.len())
}
